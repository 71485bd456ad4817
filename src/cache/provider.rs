//! Cache provider selection
//!
//! Enum dispatch over the concrete backends. Startup never fails because of
//! the cache: a backend that cannot be built degrades to NoOp, which the
//! Storage coordinator experiences as a permanent miss.

use super::errors::CacheResult;
use super::providers::{MemoryCacheService, NoOpCacheService};
use super::traits::CacheService;
use crate::config::CacheConfig;
use tracing::{info, warn};

#[cfg(feature = "cache-redis")]
use super::providers::RedisCacheService;

#[derive(Debug, Clone)]
enum CacheBackend {
    Memory(MemoryCacheService),

    /// Redis cache provider (boxed to reduce enum size)
    #[cfg(feature = "cache-redis")]
    Redis(Box<RedisCacheService>),

    NoOp(NoOpCacheService),
}

/// Cache provider handed to the Storage coordinator
#[derive(Debug, Clone)]
pub struct CacheProvider {
    backend: CacheBackend,
}

impl CacheProvider {
    /// Create a cache provider from configuration with graceful degradation
    pub async fn from_config_graceful(config: &CacheConfig) -> Self {
        let backend = match config.backend.as_str() {
            "memory" | "in-memory" => {
                info!(backend = "memory", "In-memory cache provider initialized");
                CacheBackend::Memory(MemoryCacheService::new())
            }
            "redis" => Self::create_redis_backend(config).await,
            "noop" | "none" | "disabled" => {
                info!("Cache disabled by configuration");
                CacheBackend::NoOp(NoOpCacheService::new())
            }
            other => {
                warn!(backend = other, "Unknown cache backend, falling back to NoOp");
                CacheBackend::NoOp(NoOpCacheService::new())
            }
        };

        Self { backend }
    }

    /// Attempt to create a Redis backend, falling back to NoOp on failure
    #[cfg(feature = "cache-redis")]
    async fn create_redis_backend(config: &CacheConfig) -> CacheBackend {
        let Some(url) = config.redis_url.as_deref() else {
            warn!("Redis cache selected but cache.redis_url is not set, falling back to NoOp");
            return CacheBackend::NoOp(NoOpCacheService::new());
        };

        match RedisCacheService::connect(url).await {
            Ok(service) => {
                info!(backend = "redis", "Redis cache provider initialized");
                CacheBackend::Redis(Box::new(service))
            }
            Err(e) => {
                warn!(
                    error = %e,
                    "Failed to connect to Redis, falling back to NoOp cache (graceful degradation)"
                );
                CacheBackend::NoOp(NoOpCacheService::new())
            }
        }
    }

    /// Fallback when cache-redis feature is not enabled
    #[cfg(not(feature = "cache-redis"))]
    async fn create_redis_backend(_config: &CacheConfig) -> CacheBackend {
        warn!("Redis cache backend requested but 'cache-redis' feature not enabled, using NoOp");
        CacheBackend::NoOp(NoOpCacheService::new())
    }

    /// Wrap an existing in-memory store
    pub fn memory(service: MemoryCacheService) -> Self {
        Self {
            backend: CacheBackend::Memory(service),
        }
    }

    pub fn noop() -> Self {
        Self {
            backend: CacheBackend::NoOp(NoOpCacheService::new()),
        }
    }

    /// Check if caching is actually enabled (not NoOp)
    pub fn is_enabled(&self) -> bool {
        !matches!(self.backend, CacheBackend::NoOp(_))
    }
}

impl CacheService for CacheProvider {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        match &self.backend {
            CacheBackend::Memory(s) => s.get(key).await,
            #[cfg(feature = "cache-redis")]
            CacheBackend::Redis(s) => s.get(key).await,
            CacheBackend::NoOp(s) => s.get(key).await,
        }
    }

    async fn set(&self, key: &str, value: &str) -> CacheResult<()> {
        match &self.backend {
            CacheBackend::Memory(s) => s.set(key, value).await,
            #[cfg(feature = "cache-redis")]
            CacheBackend::Redis(s) => s.set(key, value).await,
            CacheBackend::NoOp(s) => s.set(key, value).await,
        }
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        match &self.backend {
            CacheBackend::Memory(s) => s.delete(key).await,
            #[cfg(feature = "cache-redis")]
            CacheBackend::Redis(s) => s.delete(key).await,
            CacheBackend::NoOp(s) => s.delete(key).await,
        }
    }

    async fn health_check(&self) -> CacheResult<bool> {
        match &self.backend {
            CacheBackend::Memory(s) => s.health_check().await,
            #[cfg(feature = "cache-redis")]
            CacheBackend::Redis(s) => s.health_check().await,
            CacheBackend::NoOp(s) => s.health_check().await,
        }
    }

    fn provider_name(&self) -> &'static str {
        match &self.backend {
            CacheBackend::Memory(s) => s.provider_name(),
            #[cfg(feature = "cache-redis")]
            CacheBackend::Redis(s) => s.provider_name(),
            CacheBackend::NoOp(s) => s.provider_name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache_config(backend: &str) -> CacheConfig {
        CacheConfig {
            backend: backend.to_string(),
            redis_url: None,
        }
    }

    #[tokio::test]
    async fn test_default_backend_is_memory() {
        let provider = CacheProvider::from_config_graceful(&CacheConfig::default()).await;
        assert!(provider.is_enabled());
        assert_eq!(provider.provider_name(), "memory");
    }

    #[tokio::test]
    async fn test_unknown_backend_degrades_to_noop() {
        let provider = CacheProvider::from_config_graceful(&cache_config("memcached")).await;
        assert!(!provider.is_enabled());
        assert_eq!(provider.provider_name(), "noop");
    }

    #[tokio::test]
    async fn test_redis_without_url_degrades_to_noop() {
        let provider = CacheProvider::from_config_graceful(&cache_config("redis")).await;
        assert!(!provider.is_enabled());
    }

    #[cfg(feature = "cache-redis")]
    #[tokio::test]
    async fn test_unreachable_redis_degrades_to_noop() {
        let config = CacheConfig {
            backend: "redis".to_string(),
            redis_url: Some("redis://127.0.0.1:1".to_string()),
        };
        let provider = CacheProvider::from_config_graceful(&config).await;
        assert!(!provider.is_enabled());
        assert_eq!(provider.provider_name(), "noop");
    }

    #[tokio::test]
    async fn test_memory_provider_shares_wrapped_store() {
        let store = MemoryCacheService::new();
        let provider = CacheProvider::memory(store.clone());
        provider.set("analysis_data", "cached").await.unwrap();
        assert_eq!(
            store.get("analysis_data").await.unwrap().as_deref(),
            Some("cached")
        );
    }
}
