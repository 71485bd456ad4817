//! # Pipeline Configuration
//!
//! Configuration for the four pipeline services. Values are loaded by
//! [`ConfigManager`] from YAML files with environment overlays and
//! `LEXSTAT_`-prefixed environment variables; every field has a default so an
//! empty source set yields the standard port layout.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use lexstat::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//! let storage = &manager.config().storage;
//! println!("tracking {} terms under key {}", storage.tracked_terms.len(), storage.cache_key);
//! # Ok(())
//! # }
//! ```

pub mod loader;

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    deadlines, ports, services, ANALYSIS_CACHE_KEY, DEFAULT_MAX_CONCURRENT_REQUESTS,
    DEFAULT_TRACKED_TERMS,
};
use crate::error::{PipelineError, PipelineResult};

pub use loader::ConfigManager;

/// Root configuration mirroring `config/lexstat.yaml`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub text_source: TextSourceConfig,
    pub analyzer: AnalyzerConfig,
    pub storage: StorageConfig,
    pub presenter: PresenterConfig,
    /// Inter-service call settings shared by every service
    pub rpc: RpcConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TextSourceConfig {
    pub bind_address: String,
    /// Corpus file served by `ReadText`
    pub corpus_path: PathBuf,
}

impl Default for TextSourceConfig {
    fn default() -> Self {
        Self {
            bind_address: format!("0.0.0.0:{}", ports::TEXT_SOURCE),
            corpus_path: PathBuf::from("corpus/sample.txt"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub bind_address: String,
    pub text_source_url: String,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            bind_address: format!("0.0.0.0:{}", ports::ANALYZER),
            text_source_url: format!("http://127.0.0.1:{}", ports::TEXT_SOURCE),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    pub bind_address: String,
    pub analyzer_url: String,
    pub cache_key: String,
    /// Fixed at startup, immutable for the process lifetime
    pub tracked_terms: Vec<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bind_address: format!("0.0.0.0:{}", ports::STORAGE),
            analyzer_url: format!("http://127.0.0.1:{}", ports::ANALYZER),
            cache_key: ANALYSIS_CACHE_KEY.to_string(),
            tracked_terms: DEFAULT_TRACKED_TERMS.iter().map(|t| t.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PresenterConfig {
    /// Internal `GetDisplayData` RPC endpoint
    pub bind_address: String,
    /// Public HTML page
    pub http_bind_address: String,
    pub storage_url: String,
}

impl Default for PresenterConfig {
    fn default() -> Self {
        Self {
            bind_address: format!("0.0.0.0:{}", ports::PRESENTER),
            http_bind_address: format!("0.0.0.0:{}", ports::PRESENTER_HTTP),
            storage_url: format!("http://127.0.0.1:{}", ports::STORAGE),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RpcConfig {
    /// Bounded worker pool: requests handled in parallel per service
    pub max_concurrent_requests: usize,
    /// Deadline for calls to the TextSource; 0 disables it
    pub text_source_timeout_ms: u64,
    /// Deadline for calls to the Analyzer; 0 disables it
    pub analyzer_timeout_ms: u64,
    /// Deadline for calls to Storage; 0 disables it
    pub storage_timeout_ms: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
            text_source_timeout_ms: deadlines::TEXT_SOURCE_MS,
            analyzer_timeout_ms: deadlines::ANALYZER_MS,
            storage_timeout_ms: deadlines::STORAGE_MS,
        }
    }
}

impl RpcConfig {
    /// Deadline for calls made to `service`
    pub fn timeout_for(&self, service: &str) -> Option<Duration> {
        let ms = match service {
            services::TEXT_SOURCE => self.text_source_timeout_ms,
            services::ANALYZER => self.analyzer_timeout_ms,
            _ => self.storage_timeout_ms,
        };
        (ms > 0).then(|| Duration::from_millis(ms))
    }

    /// Same deadline on every hop, e.g. for tests
    pub fn with_uniform_timeout_ms(mut self, ms: u64) -> Self {
        self.text_source_timeout_ms = ms;
        self.analyzer_timeout_ms = ms;
        self.storage_timeout_ms = ms;
        self
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// `memory`, `redis` or `noop`
    pub backend: String,
    pub redis_url: Option<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: "memory".to_string(),
            redis_url: None,
        }
    }
}

impl PipelineConfig {
    /// Reject configurations no service could run with
    pub fn validate(&self) -> PipelineResult<()> {
        for (field, address) in [
            ("text_source.bind_address", &self.text_source.bind_address),
            ("analyzer.bind_address", &self.analyzer.bind_address),
            ("storage.bind_address", &self.storage.bind_address),
            ("presenter.bind_address", &self.presenter.bind_address),
            (
                "presenter.http_bind_address",
                &self.presenter.http_bind_address,
            ),
        ] {
            address.parse::<SocketAddr>().map_err(|e| {
                PipelineError::configuration(format!("{field} '{address}' is invalid: {e}"))
            })?;
        }

        if self.rpc.max_concurrent_requests == 0 {
            return Err(PipelineError::configuration(
                "rpc.max_concurrent_requests must be greater than 0",
            ));
        }

        let hops = [
            ("rpc.text_source_timeout_ms", self.rpc.text_source_timeout_ms),
            ("rpc.analyzer_timeout_ms", self.rpc.analyzer_timeout_ms),
            ("rpc.storage_timeout_ms", self.rpc.storage_timeout_ms),
        ];
        for pair in hops.windows(2) {
            let ((inner_field, inner), (outer_field, outer)) = (pair[0], pair[1]);
            if inner > 0 && outer > 0 && outer <= inner {
                return Err(PipelineError::configuration(format!(
                    "{outer_field} ({outer}) must exceed {inner_field} ({inner})"
                )));
            }
        }

        if self.storage.cache_key.is_empty() {
            return Err(PipelineError::configuration(
                "storage.cache_key must not be empty",
            ));
        }

        if let Some(position) = self
            .storage
            .tracked_terms
            .iter()
            .position(|t| t.trim().is_empty())
        {
            return Err(PipelineError::configuration(format!(
                "storage.tracked_terms[{position}] is empty"
            )));
        }

        Ok(())
    }
}
