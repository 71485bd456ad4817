//! Concrete cache backends

mod memory;
mod noop;
#[cfg(feature = "cache-redis")]
mod redis;

pub use memory::MemoryCacheService;
pub use noop::NoOpCacheService;
#[cfg(feature = "cache-redis")]
pub use self::redis::RedisCacheService;
