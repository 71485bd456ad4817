//! # Analysis Cache
//!
//! Keyed store behind the Storage service's cache-aside protocol.
//!
//! ```text
//! CacheProvider (enum)            <- dispatch without a vtable
//!   ├── Memory(MemoryCacheService)  <- in-process map, default and test substitute
//!   ├── Redis(RedisCacheService)    <- shared store, `cache-redis` feature
//!   └── NoOp(NoOpCacheService)      <- always miss, always succeed
//! ```
//!
//! Entries never expire and are never versioned: a key is either present or
//! absent. A backend that cannot be reached is a miss to the caller, and
//! writes are best-effort.

pub mod errors;
pub mod provider;
pub mod providers;
pub mod traits;

pub use errors::{CacheError, CacheResult};
pub use provider::CacheProvider;
pub use providers::{MemoryCacheService, NoOpCacheService};
pub use traits::CacheService;

#[cfg(feature = "cache-redis")]
pub use providers::RedisCacheService;
