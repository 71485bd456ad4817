//! Redis cache provider
//!
//! Uses `redis::aio::ConnectionManager` for async multiplexed connections.
//! Requires the `cache-redis` feature flag.

use crate::cache::errors::{CacheError, CacheResult};
use crate::cache::traits::CacheService;
use crate::config::loader::redact_url;
use std::time::Duration;
use tracing::debug;

/// Upper bound on the initial connection, including the manager's retries
const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// Redis-backed cache service using ConnectionManager
#[derive(Clone)]
pub struct RedisCacheService {
    connection_manager: redis::aio::ConnectionManager,
}

impl std::fmt::Debug for RedisCacheService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCacheService")
            .field("connection_manager", &"ConnectionManager")
            .finish()
    }
}

impl RedisCacheService {
    pub async fn connect(url: &str) -> CacheResult<Self> {
        let client = redis::Client::open(url).map_err(|e| {
            CacheError::ConnectionError(format!("Failed to create Redis client: {}", e))
        })?;

        let connection_manager =
            tokio::time::timeout(CONNECT_TIMEOUT, redis::aio::ConnectionManager::new(client))
                .await
                .map_err(|_| {
                    CacheError::ConnectionError(format!(
                        "Timed out connecting to Redis after {}s",
                        CONNECT_TIMEOUT.as_secs()
                    ))
                })?
                .map_err(|e| {
                    CacheError::ConnectionError(format!("Failed to connect to Redis: {}", e))
                })?;

        debug!(url = %redact_url(url), "Redis cache service connected");

        Ok(Self { connection_manager })
    }
}

impl CacheService for RedisCacheService {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.connection_manager.clone();
        let result: Option<String> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| CacheError::BackendError(format!("Redis GET failed: {}", e)))?;

        debug!(key = key, hit = result.is_some(), "Redis cache GET");
        Ok(result)
    }

    async fn set(&self, key: &str, value: &str) -> CacheResult<()> {
        let mut conn = self.connection_manager.clone();

        redis::cmd("SET")
            .arg(key)
            .arg(value)
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| CacheError::BackendError(format!("Redis SET failed: {}", e)))?;

        debug!(key = key, "Redis cache SET");
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        let mut conn = self.connection_manager.clone();

        redis::cmd("DEL")
            .arg(key)
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| CacheError::BackendError(format!("Redis DEL failed: {}", e)))?;

        debug!(key = key, "Redis cache DEL");
        Ok(())
    }

    async fn health_check(&self) -> CacheResult<bool> {
        let mut conn = self.connection_manager.clone();
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| CacheError::BackendError(format!("Redis PING failed: {}", e)))?;

        Ok(pong == "PONG")
    }

    fn provider_name(&self) -> &'static str {
        "redis"
    }
}
