//! # Pipeline Services
//!
//! ```text
//! Presenter -> Storage -> Analyzer -> TextSource
//!                 |
//!               cache
//! ```
//!
//! Each service has a domain type holding its logic, a `router` exposing it
//! over RPC, a client trait the next service up depends on, and an HTTP
//! implementation of that trait.

pub mod analyzer;
pub mod presenter;
pub mod storage;
pub mod text_source;

pub use analyzer::{AnalyzerClient, AnalyzerService, HttpAnalyzerClient};
pub use presenter::PresenterService;
pub use storage::{CacheStats, CacheStatsSnapshot, HttpStorageClient, StorageClient, StorageService};
pub use text_source::{HttpTextSourceClient, TextSourceClient, TextSourceService};
