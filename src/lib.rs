#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # lexstat
//!
//! Four cooperating services that compute and display lexical statistics for
//! a text corpus, with cache-aside result storage.
//!
//! ```text
//! Presenter ──GetData──▶ Storage ──AnalyzeText──▶ Analyzer ──ReadText──▶ TextSource
//!    │                     │
//!  GET /                 cache (key: analysis_data)
//! ```
//!
//! Storage serves the cached rendering of the analysis when present. On a
//! miss it asks the Analyzer to compute it over the full corpus, stores the
//! result and returns it. Analyzer failures become "not found" at Storage and
//! "No data found." at the Presenter; they never crash a service.
//!
//! ## Module Organization
//!
//! - [`analysis`] - word, sentence and tracked-term statistics
//! - [`cache`] - keyed store trait and memory / redis / noop providers
//! - [`services`] - the four services, their client traits and HTTP clients
//! - [`rpc`] - JSON-over-HTTP server, client and error envelope
//! - [`bootstrap`] - starting services from configuration
//! - [`config`] - YAML + environment configuration
//! - [`error`] - structured error handling
//! - [`logging`] - structured logging setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lexstat::bootstrap;
//! use lexstat::config::PipelineConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let handle = bootstrap::start_all(&PipelineConfig::default()).await?;
//! // ... serve until shutdown
//! handle.stop_all().await?;
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod bootstrap;
pub mod cache;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod messages;
pub mod rpc;
pub mod services;

pub use analysis::AnalysisResult;
pub use config::{ConfigManager, PipelineConfig};
pub use error::{PipelineError, PipelineResult};
pub use services::{PresenterService, StorageService};
