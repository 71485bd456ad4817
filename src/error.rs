//! Error types for the lexstat pipeline.
//!
//! Every service boundary converts these into a response-level status plus a
//! safe default payload, so none of them is allowed to escape a handler.

use thiserror::Error;

use crate::cache::CacheError;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// A dependency call failed, timed out, or returned an error status
    #[error("Upstream unavailable: {service} - {reason}")]
    UpstreamUnavailable { service: String, reason: String },

    /// Analysis could not complete
    #[error("Compute failure: {0}")]
    ComputeFailure(String),

    /// The cache backend could not be reached; callers treat this as a miss
    #[error("Cache unavailable: {0}")]
    CacheUnavailable(String),

    #[error("Corpus read failed: {0}")]
    CorpusRead(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Server error: {0}")]
    Server(String),
}

impl PipelineError {
    /// Create an upstream error for the named dependency
    pub fn upstream(service: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UpstreamUnavailable {
            service: service.into(),
            reason: reason.into(),
        }
    }

    pub fn compute(message: impl Into<String>) -> Self {
        Self::ComputeFailure(message.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Taxonomy category used in structured logs
    pub fn category(&self) -> &'static str {
        match self {
            Self::UpstreamUnavailable { .. } => "upstream_unavailable",
            Self::ComputeFailure(_) => "compute_failure",
            Self::CacheUnavailable(_) => "cache_unavailable",
            Self::CorpusRead(_) => "io_error",
            Self::Configuration(_) => "configuration",
            Self::Serialization(_) => "serialization",
            Self::Server(_) => "server",
        }
    }
}

impl From<CacheError> for PipelineError {
    fn from(e: CacheError) -> Self {
        PipelineError::CacheUnavailable(e.to_string())
    }
}

impl From<config::ConfigError> for PipelineError {
    fn from(e: config::ConfigError) -> Self {
        PipelineError::Configuration(e.to_string())
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_error_display() {
        let err = PipelineError::upstream("text_source", "connection refused");
        assert_eq!(
            err.to_string(),
            "Upstream unavailable: text_source - connection refused"
        );
        assert_eq!(err.category(), "upstream_unavailable");
    }

    #[test]
    fn test_cache_error_converts_to_cache_unavailable() {
        let err: PipelineError = CacheError::ConnectionError("refused".to_string()).into();
        assert!(matches!(err, PipelineError::CacheUnavailable(_)));
    }

    #[test]
    fn test_io_error_converts_to_corpus_read() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing corpus");
        let err: PipelineError = io.into();
        assert_eq!(err.category(), "io_error");
        assert!(err.to_string().contains("missing corpus"));
    }
}
