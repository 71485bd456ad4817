//! # Storage Service
//!
//! Cache-aside coordinator behind `GetData`.
//!
//! ```text
//! Start -> CacheLookup -+- HIT  --------------------------------> Respond(found)
//!                       +- MISS -> Compute -+- SUCCESS -> WriteCache -> Respond(found)
//!                                           +- FAILURE -----------> Respond(not found)
//! ```
//!
//! An unreachable cache is a miss. A cache hit never triggers computation.
//! The cache write after a computation is best-effort: a failed write is
//! logged and counted, and the freshly computed value is still returned.
//! A failed computation never writes the cache.
//!
//! There is no lock around the single key. Concurrent misses each compute
//! and each write; the last writer wins, and since all of them read the same
//! corpus with the same tracked terms their values agree.

use async_trait::async_trait;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::analyzer::AnalyzerClient;
use crate::cache::CacheService;
use crate::config::{RpcConfig, StorageConfig};
use crate::constants::{methods, services};
use crate::error::{PipelineError, PipelineResult};
use crate::logging::{log_error, log_service_operation};
use crate::messages::{DataResponse, EmptyRequest};
use crate::rpc::{HealthResponse, RpcClient, RpcReply};

/// Anything that can answer `GetData`
#[async_trait]
pub trait StorageClient: Send + Sync {
    async fn get_data(&self) -> PipelineResult<DataResponse>;
}

/// Counters describing how `GetData` calls were resolved
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    computations: AtomicU64,
    compute_failures: AtomicU64,
    write_failures: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub computations: u64,
    pub compute_failures: u64,
    pub write_failures: u64,
}

impl CacheStats {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CacheStatsSnapshot {
        CacheStatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            computations: self.computations.load(Ordering::Relaxed),
            compute_failures: self.compute_failures.load(Ordering::Relaxed),
            write_failures: self.write_failures.load(Ordering::Relaxed),
        }
    }
}

pub struct StorageService<C> {
    cache: C,
    analyzer: Arc<dyn AnalyzerClient>,
    cache_key: String,
    tracked_terms: Vec<String>,
    stats: CacheStats,
}

impl<C: CacheService> std::fmt::Debug for StorageService<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageService")
            .field("cache", &self.cache.provider_name())
            .field("cache_key", &self.cache_key)
            .field("tracked_terms", &self.tracked_terms)
            .finish_non_exhaustive()
    }
}

impl<C: CacheService> StorageService<C> {
    pub fn new(
        cache: C,
        analyzer: Arc<dyn AnalyzerClient>,
        cache_key: impl Into<String>,
        tracked_terms: Vec<String>,
    ) -> Self {
        Self {
            cache,
            analyzer,
            cache_key: cache_key.into(),
            tracked_terms,
            stats: CacheStats::default(),
        }
    }

    pub fn from_config(cache: C, analyzer: Arc<dyn AnalyzerClient>, config: &StorageConfig) -> Self {
        Self::new(
            cache,
            analyzer,
            config.cache_key.clone(),
            config.tracked_terms.clone(),
        )
    }

    pub fn cache_key(&self) -> &str {
        &self.cache_key
    }

    pub fn tracked_terms(&self) -> &[String] {
        &self.tracked_terms
    }

    pub fn stats(&self) -> CacheStatsSnapshot {
        self.stats.snapshot()
    }

    /// Serve the cached analysis, computing and caching it on a miss
    pub async fn get_data(&self) -> DataResponse {
        match self.cache.get(&self.cache_key).await {
            Ok(Some(data)) if !data.is_empty() => {
                CacheStats::bump(&self.stats.hits);
                debug!(key = %self.cache_key, "Data found in cache");
                return DataResponse::found(data);
            }
            Ok(_) => {
                info!(key = %self.cache_key, "No data found in cache, triggering analysis");
            }
            Err(e) => {
                let err = PipelineError::from(e);
                warn!(
                    key = %self.cache_key,
                    error = %err,
                    "Cache lookup failed, treating as a miss"
                );
            }
        }
        CacheStats::bump(&self.stats.misses);

        self.compute_and_store().await
    }

    async fn compute_and_store(&self) -> DataResponse {
        CacheStats::bump(&self.stats.computations);

        let result = match self.analyzer.analyze_text(&self.tracked_terms).await {
            Ok(result) => result,
            Err(e) => {
                CacheStats::bump(&self.stats.compute_failures);
                log_error(
                    services::STORAGE,
                    "compute",
                    &e.to_string(),
                    Some(e.category()),
                );
                return DataResponse::not_found();
            }
        };

        let data = result.to_display_string(&self.tracked_terms);

        if let Err(e) = self.cache.set(&self.cache_key, &data).await {
            CacheStats::bump(&self.stats.write_failures);
            warn!(
                key = %self.cache_key,
                error = %e,
                "Failed to store analysis in cache, returning computed value"
            );
        } else {
            info!(key = %self.cache_key, "Stored analyzed data in cache");
        }

        DataResponse::found(data)
    }

    /// Remove the cached entry so the next `GetData` recomputes
    pub async fn clear_cache(&self) -> PipelineResult<()> {
        self.cache.delete(&self.cache_key).await?;
        info!(key = %self.cache_key, "Cache entry cleared");
        Ok(())
    }
}

#[async_trait]
impl<C: CacheService> StorageClient for StorageService<C> {
    async fn get_data(&self) -> PipelineResult<DataResponse> {
        Ok(StorageService::get_data(self).await)
    }
}

/// Router exposing `POST /rpc/GetData` and `GET /health` with cache counters
pub fn router<C: CacheService + 'static>(service: Arc<StorageService<C>>) -> Router {
    Router::new()
        .route(&methods::route(methods::GET_DATA), post(get_data_handler::<C>))
        .route("/health", get(health_handler::<C>))
        .with_state(service)
}

async fn get_data_handler<C: CacheService + 'static>(
    State(service): State<Arc<StorageService<C>>>,
) -> RpcReply<DataResponse> {
    log_service_operation(services::STORAGE, methods::GET_DATA, "received", None);

    // Runs to completion even if the caller disconnects or times out
    let task = tokio::spawn(async move { service.get_data().await });
    match task.await {
        Ok(response) => RpcReply::ok(response),
        Err(e) => {
            log_error(
                services::STORAGE,
                methods::GET_DATA,
                &e.to_string(),
                Some("task"),
            );
            RpcReply::failed(
                DataResponse::not_found(),
                format!("Failed to get data: {e}"),
            )
        }
    }
}

async fn health_handler<C: CacheService + 'static>(
    State(service): State<Arc<StorageService<C>>>,
) -> Json<HealthResponse> {
    let cache_healthy = service.cache.health_check().await.unwrap_or(false);
    Json(
        HealthResponse::ok(services::STORAGE).with_details(serde_json::json!({
            "cache_provider": service.cache.provider_name(),
            "cache_healthy": cache_healthy,
            "stats": service.stats(),
        })),
    )
}

/// `StorageClient` over the network
#[derive(Debug, Clone)]
pub struct HttpStorageClient {
    rpc: RpcClient,
}

impl HttpStorageClient {
    pub fn new(base_url: &str, rpc: &RpcConfig) -> PipelineResult<Self> {
        Ok(Self {
            rpc: RpcClient::new(services::STORAGE, base_url, rpc)?,
        })
    }
}

#[async_trait]
impl StorageClient for HttpStorageClient {
    async fn get_data(&self) -> PipelineResult<DataResponse> {
        self.rpc
            .call(methods::GET_DATA, &EmptyRequest::default())
            .await
    }
}
