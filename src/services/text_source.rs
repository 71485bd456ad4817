//! # TextSource Service
//!
//! Leaf of the pipeline: serves the full corpus text on every `ReadText`
//! call, reading it fresh each time. A read failure is reported as an
//! `INTERNAL` status with an empty text, never as a crash.

use async_trait::async_trait;
use axum::extract::State;
use axum::routing::{get, post};
use axum::Router;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use crate::config::RpcConfig;
use crate::constants::{methods, services};
use crate::error::PipelineResult;
use crate::logging::{log_error, log_service_operation, preview};
use crate::messages::{EmptyRequest, ReadTextResponse};
use crate::rpc::health::basic_health;
use crate::rpc::{RpcClient, RpcReply};

/// Anything that can supply the corpus text
#[async_trait]
pub trait TextSourceClient: Send + Sync {
    async fn read_text(&self) -> PipelineResult<String>;
}

/// Serves a corpus file
#[derive(Debug, Clone)]
pub struct TextSourceService {
    corpus_path: PathBuf,
}

impl TextSourceService {
    pub fn new(corpus_path: impl Into<PathBuf>) -> Self {
        Self {
            corpus_path: corpus_path.into(),
        }
    }

    pub fn corpus_path(&self) -> &Path {
        &self.corpus_path
    }
}

#[async_trait]
impl TextSourceClient for TextSourceService {
    async fn read_text(&self) -> PipelineResult<String> {
        let text = tokio::fs::read_to_string(&self.corpus_path).await?;
        debug!(
            path = %self.corpus_path.display(),
            chars = text.chars().count(),
            preview = %preview(&text),
            "Corpus read"
        );
        Ok(text)
    }
}

/// Router exposing `POST /rpc/ReadText` and `GET /health`
pub fn router(service: Arc<TextSourceService>) -> Router {
    Router::new()
        .route(&methods::route(methods::READ_TEXT), post(read_text_handler))
        .route("/health", get(basic_health(services::TEXT_SOURCE)))
        .with_state(service)
}

async fn read_text_handler(
    State(service): State<Arc<TextSourceService>>,
) -> RpcReply<ReadTextResponse> {
    log_service_operation(services::TEXT_SOURCE, methods::READ_TEXT, "received", None);

    match service.read_text().await {
        Ok(text) => RpcReply::ok(ReadTextResponse { text }),
        Err(e) => {
            log_error(
                services::TEXT_SOURCE,
                methods::READ_TEXT,
                &e.to_string(),
                Some(&service.corpus_path.display().to_string()),
            );
            RpcReply::failed(
                ReadTextResponse::default(),
                format!("Failed to read text: {e}"),
            )
        }
    }
}

/// `TextSourceClient` over the network
#[derive(Debug, Clone)]
pub struct HttpTextSourceClient {
    rpc: RpcClient,
}

impl HttpTextSourceClient {
    pub fn new(base_url: &str, rpc: &RpcConfig) -> PipelineResult<Self> {
        Ok(Self {
            rpc: RpcClient::new(services::TEXT_SOURCE, base_url, rpc)?,
        })
    }
}

#[async_trait]
impl TextSourceClient for HttpTextSourceClient {
    async fn read_text(&self) -> PipelineResult<String> {
        let response: ReadTextResponse = self
            .rpc
            .call(methods::READ_TEXT, &EmptyRequest::default())
            .await?;
        Ok(response.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use crate::rpc::RpcServer;
    use std::io::Write;

    fn corpus_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_reads_fresh_text_each_call() {
        let file = corpus_file("Thou art here.");
        let service = TextSourceService::new(file.path());
        assert_eq!(service.read_text().await.unwrap(), "Thou art here.");

        std::fs::write(file.path(), "Ye are gone.").unwrap();
        assert_eq!(service.read_text().await.unwrap(), "Ye are gone.");
    }

    #[tokio::test]
    async fn test_missing_corpus_is_io_error() {
        let service = TextSourceService::new("/nonexistent/corpus.txt");
        let err = service.read_text().await.unwrap_err();
        assert!(matches!(err, PipelineError::CorpusRead(_)));
    }

    #[tokio::test]
    async fn test_rpc_round_trip_and_failure_envelope() {
        let file = corpus_file("Hither and thither.");
        let ok = RpcServer::new(
            services::TEXT_SOURCE,
            "127.0.0.1:0",
            router(Arc::new(TextSourceService::new(file.path()))),
            &RpcConfig::default(),
        )
        .spawn()
        .await
        .unwrap();
        let client = HttpTextSourceClient::new(&ok.base_url(), &RpcConfig::default()).unwrap();
        assert_eq!(client.read_text().await.unwrap(), "Hither and thither.");

        let broken = RpcServer::new(
            services::TEXT_SOURCE,
            "127.0.0.1:0",
            router(Arc::new(TextSourceService::new("/nonexistent/corpus.txt"))),
            &RpcConfig::default(),
        )
        .spawn()
        .await
        .unwrap();

        let raw = reqwest::Client::new()
            .post(format!("{}/rpc/ReadText", broken.base_url()))
            .json(&serde_json::json!({}))
            .send()
            .await
            .unwrap();
        assert_eq!(raw.status().as_u16(), 500);
        let body: serde_json::Value = raw.json().await.unwrap();
        assert_eq!(body["text"], "");
        assert_eq!(body["error"]["code"], "INTERNAL");

        let client = HttpTextSourceClient::new(&broken.base_url(), &RpcConfig::default()).unwrap();
        let err = client.read_text().await.unwrap_err();
        assert!(err.to_string().contains("Failed to read text"));

        ok.stop().await.unwrap();
        broken.stop().await.unwrap();
    }
}
