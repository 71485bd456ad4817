//! In-memory cache provider
//!
//! Process-local map. Clones share the same entries, so a test can keep a
//! handle and inspect what the Storage coordinator wrote.

use crate::cache::errors::CacheResult;
use crate::cache::traits::CacheService;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct MemoryCacheService {
    entries: Arc<DashMap<String, String>>,
}

impl MemoryCacheService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CacheService for MemoryCacheService {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let value = self.entries.get(key).map(|entry| entry.value().clone());
        debug!(key = key, hit = value.is_some(), "Memory cache GET");
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> CacheResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        debug!(key = key, bytes = value.len(), "Memory cache SET");
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.entries.remove(key);
        debug!(key = key, "Memory cache DEL");
        Ok(())
    }

    async fn health_check(&self) -> CacheResult<bool> {
        Ok(true)
    }

    fn provider_name(&self) -> &'static str {
        "memory"
    }
}
