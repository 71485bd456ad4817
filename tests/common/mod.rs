//! Shared test doubles for the integration tests.
//!
//! Each mock records how often it was called so tests can assert that a
//! cache hit never reaches the analyzer.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use lexstat::analysis::{self, AnalysisResult};
use lexstat::cache::{CacheError, CacheResult, CacheService};
use lexstat::config::{PipelineConfig, PresenterConfig, TextSourceConfig};
use lexstat::error::{PipelineError, PipelineResult};
use lexstat::services::{AnalyzerClient, TextSourceClient};

pub const SAMPLE_TEXT: &str = "Thou hast seen. Wherefore dost thou linger?";

pub fn terms(list: &[&str]) -> Vec<String> {
    list.iter().map(|t| t.to_string()).collect()
}

/// Analyzer double that computes over a fixed text and counts calls
pub struct CountingAnalyzer {
    text: String,
    calls: AtomicUsize,
    failing: AtomicBool,
    delay: Option<Duration>,
}

impl CountingAnalyzer {
    pub fn new(text: &str) -> Arc<Self> {
        Arc::new(Self {
            text: text.to_string(),
            calls: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
            delay: None,
        })
    }

    /// Slow analyzer, so concurrent callers overlap
    pub fn with_delay(text: &str, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            text: text.to_string(),
            calls: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
            delay: Some(delay),
        })
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnalyzerClient for CountingAnalyzer {
    async fn analyze_text(&self, tracked_terms: &[String]) -> PipelineResult<AnalysisResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(PipelineError::upstream("analyzer", "connection refused"));
        }
        analysis::analyze(&self.text, tracked_terms)
    }
}

/// Text source that always fails
pub struct FailingTextSource;

#[async_trait]
impl TextSourceClient for FailingTextSource {
    async fn read_text(&self) -> PipelineResult<String> {
        Err(std::io::Error::new(std::io::ErrorKind::NotFound, "corpus missing").into())
    }
}

/// Cache whose reads and writes can be broken independently
#[derive(Default)]
pub struct FailingCache {
    pub fail_reads: bool,
    pub fail_writes: bool,
    entries: std::sync::Mutex<BTreeMap<String, String>>,
    writes: AtomicUsize,
}

impl FailingCache {
    pub fn new(fail_reads: bool, fail_writes: bool) -> Self {
        Self {
            fail_reads,
            fail_writes,
            ..Self::default()
        }
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn stored(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }
}

impl CacheService for FailingCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        if self.fail_reads {
            return Err(CacheError::ConnectionError("connection refused".to_string()));
        }
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> CacheResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes {
            return Err(CacheError::BackendError("OOM command not allowed".to_string()));
        }
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }

    async fn health_check(&self) -> CacheResult<bool> {
        Ok(!self.fail_reads)
    }

    fn provider_name(&self) -> &'static str {
        "failing"
    }
}

/// Every listener on an ephemeral loopback port, reading `corpus`
pub fn local_config(corpus: &std::path::Path) -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.text_source = TextSourceConfig {
        bind_address: "127.0.0.1:0".to_string(),
        corpus_path: corpus.to_path_buf(),
    };
    config.analyzer.bind_address = "127.0.0.1:0".to_string();
    config.storage.bind_address = "127.0.0.1:0".to_string();
    config.presenter = PresenterConfig {
        bind_address: "127.0.0.1:0".to_string(),
        http_bind_address: "127.0.0.1:0".to_string(),
        ..PresenterConfig::default()
    };
    config
}
