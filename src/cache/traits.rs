//! Cache service trait definition

use super::errors::CacheResult;

/// Keyed string store used by the Storage coordinator
///
/// Implemented by the concrete providers and by [`super::CacheProvider`].
pub trait CacheService: Send + Sync {
    /// Returns `Ok(Some(value))` on hit, `Ok(None)` on miss.
    fn get(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = CacheResult<Option<String>>> + Send;

    /// Store a value, overwriting any previous one
    fn set(&self, key: &str, value: &str)
        -> impl std::future::Future<Output = CacheResult<()>> + Send;

    /// Delete a specific key from the cache
    fn delete(&self, key: &str) -> impl std::future::Future<Output = CacheResult<()>> + Send;

    /// Check if the cache backend is healthy
    fn health_check(&self) -> impl std::future::Future<Output = CacheResult<bool>> + Send;

    /// Get the name of the cache provider
    fn provider_name(&self) -> &'static str;
}
