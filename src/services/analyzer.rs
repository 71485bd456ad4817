//! # Analyzer Service
//!
//! `AnalyzeText(trackedTerms)` fetches the corpus from the TextSource and
//! computes [`AnalysisResult`]. The computation itself is pure; the only
//! failure it adds is the upstream one, reported as `INTERNAL` with a
//! zero-valued result.

use async_trait::async_trait;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use tracing::{debug, info};

use super::text_source::TextSourceClient;
use crate::analysis::{self, AnalysisResult};
use crate::config::RpcConfig;
use crate::constants::{methods, services};
use crate::error::{PipelineError, PipelineResult};
use crate::logging::{log_error, log_service_operation, preview};
use crate::messages::AnalyzeTextRequest;
use crate::rpc::health::basic_health;
use crate::rpc::{RpcClient, RpcReply};

/// Anything that can analyze the corpus for a set of tracked terms
#[async_trait]
pub trait AnalyzerClient: Send + Sync {
    async fn analyze_text(&self, tracked_terms: &[String]) -> PipelineResult<AnalysisResult>;
}

pub struct AnalyzerService {
    text_source: Arc<dyn TextSourceClient>,
}

impl std::fmt::Debug for AnalyzerService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyzerService").finish_non_exhaustive()
    }
}

impl AnalyzerService {
    pub fn new(text_source: Arc<dyn TextSourceClient>) -> Self {
        Self { text_source }
    }
}

#[async_trait]
impl AnalyzerClient for AnalyzerService {
    async fn analyze_text(&self, tracked_terms: &[String]) -> PipelineResult<AnalysisResult> {
        let text = self.text_source.read_text().await.map_err(|e| match e {
            upstream @ PipelineError::UpstreamUnavailable { .. } => upstream,
            other => PipelineError::upstream(services::TEXT_SOURCE, other.to_string()),
        })?;
        debug!(preview = %preview(&text), "Text received from text source");

        // CPU-bound over the whole corpus
        let terms = tracked_terms.to_vec();
        let result = tokio::task::spawn_blocking(move || analysis::analyze(&text, &terms))
            .await
            .map_err(|e| PipelineError::compute(format!("analysis task failed: {e}")))??;

        info!(
            avg_word_length = result.avg_word_length,
            avg_sentence_length = result.avg_sentence_length,
            frequencies = ?result.term_frequencies,
            "Analysis complete"
        );
        Ok(result)
    }
}

/// Router exposing `POST /rpc/AnalyzeText` and `GET /health`
pub fn router(service: Arc<AnalyzerService>) -> Router {
    Router::new()
        .route(
            &methods::route(methods::ANALYZE_TEXT),
            post(analyze_text_handler),
        )
        .route("/health", get(basic_health(services::ANALYZER)))
        .with_state(service)
}

async fn analyze_text_handler(
    State(service): State<Arc<AnalyzerService>>,
    payload: Result<Json<AnalyzeTextRequest>, JsonRejection>,
) -> RpcReply<AnalysisResult> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            log_error(
                services::ANALYZER,
                methods::ANALYZE_TEXT,
                &rejection.body_text(),
                Some("request"),
            );
            return RpcReply::failed(
                AnalysisResult::default(),
                format!("Failed to analyze text: invalid request: {}", rejection.body_text()),
            );
        }
    };

    log_service_operation(
        services::ANALYZER,
        methods::ANALYZE_TEXT,
        "received",
        Some(&format!("tracked_terms={}", request.tracked_terms.len())),
    );

    // Runs to completion even if the caller disconnects or times out
    let task =
        tokio::spawn(async move { service.analyze_text(&request.tracked_terms).await });
    let outcome = task
        .await
        .unwrap_or_else(|e| Err(PipelineError::compute(format!("analysis task failed: {e}"))));

    match outcome {
        Ok(result) => RpcReply::ok(result),
        Err(e) => {
            log_error(
                services::ANALYZER,
                methods::ANALYZE_TEXT,
                &e.to_string(),
                Some(e.category()),
            );
            RpcReply::failed(
                AnalysisResult::default(),
                format!("Failed to analyze text: {e}"),
            )
        }
    }
}

/// `AnalyzerClient` over the network
#[derive(Debug, Clone)]
pub struct HttpAnalyzerClient {
    rpc: RpcClient,
}

impl HttpAnalyzerClient {
    pub fn new(base_url: &str, rpc: &RpcConfig) -> PipelineResult<Self> {
        Ok(Self {
            rpc: RpcClient::new(services::ANALYZER, base_url, rpc)?,
        })
    }
}

#[async_trait]
impl AnalyzerClient for HttpAnalyzerClient {
    async fn analyze_text(&self, tracked_terms: &[String]) -> PipelineResult<AnalysisResult> {
        let request = AnalyzeTextRequest {
            tracked_terms: tracked_terms.to_vec(),
        };
        self.rpc.call(methods::ANALYZE_TEXT, &request).await
    }
}
