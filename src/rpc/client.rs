//! # RPC Client
//!
//! Typed JSON client for one downstream service. Every failure mode (refused
//! connection, deadline, error status, undecodable body) surfaces as
//! [`PipelineError::UpstreamUnavailable`] naming the service.

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error};

use super::envelope::FailureView;
use crate::config::RpcConfig;
use crate::constants::methods;
use crate::error::{PipelineError, PipelineResult};

#[derive(Clone)]
pub struct RpcClient {
    service: &'static str,
    client: Client,
    base_url: Url,
    timeout: Option<Duration>,
}

impl std::fmt::Debug for RpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcClient")
            .field("service", &self.service)
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl RpcClient {
    /// Build a client for `service` reachable at `base_url`
    pub fn new(service: &'static str, base_url: &str, rpc: &RpcConfig) -> PipelineResult<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            PipelineError::configuration(format!("Invalid {service} URL '{base_url}': {e}"))
        })?;

        let timeout = rpc.timeout_for(service);
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            PipelineError::configuration(format!("Failed to build {service} client: {e}"))
        })?;

        Ok(Self {
            service,
            client,
            base_url,
            timeout,
        })
    }

    pub fn service(&self) -> &'static str {
        self.service
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Invoke `method` and decode its response payload
    pub async fn call<Req, Resp>(&self, method: &str, request: &Req) -> PipelineResult<Resp>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let url = self
            .base_url
            .join(&methods::route(method))
            .map_err(|e| self.upstream(format!("invalid method URL: {e}")))?;

        debug!(service = self.service, method = method, url = %url, "Calling upstream");

        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                let reason = if e.is_timeout() {
                    format!(
                        "{method} exceeded its {}ms deadline",
                        self.timeout.map(|t| t.as_millis()).unwrap_or_default()
                    )
                } else {
                    format!("{method} request failed: {e}")
                };
                error!(service = self.service, method = method, reason = %reason, "Upstream call failed");
                self.upstream(reason)
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = match response.json::<FailureView>().await {
                Ok(view) => view.error.message,
                Err(_) => status
                    .canonical_reason()
                    .unwrap_or("unknown status")
                    .to_string(),
            };
            error!(
                service = self.service,
                method = method,
                status = status.as_u16(),
                detail = %detail,
                "Upstream returned an error status"
            );
            return Err(self.upstream(format!("{method} returned {}: {detail}", status.as_u16())));
        }

        response
            .json::<Resp>()
            .await
            .map_err(|e| self.upstream(format!("{method} returned an invalid body: {e}")))
    }

    fn upstream(&self, reason: String) -> PipelineError {
        PipelineError::upstream(self.service, reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::{EmptyRequest, ReadTextResponse};
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, timeout_ms: u64) -> RpcClient {
        let rpc = RpcConfig::default().with_uniform_timeout_ms(timeout_ms);
        RpcClient::new("text_source", &server.uri(), &rpc).unwrap()
    }

    #[tokio::test]
    async fn test_call_decodes_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rpc/ReadText"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "text": "Hither" })))
            .expect(1)
            .mount(&server)
            .await;

        let response: ReadTextResponse = client_for(&server, 1000)
            .call("ReadText", &EmptyRequest::default())
            .await
            .unwrap();
        assert_eq!(response.text, "Hither");
    }

    #[tokio::test]
    async fn test_error_status_carries_server_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rpc/ReadText"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "text": "",
                "error": { "code": "INTERNAL", "message": "Failed to read text: gone" }
            })))
            .mount(&server)
            .await;

        let err = client_for(&server, 1000)
            .call::<_, ReadTextResponse>("ReadText", &EmptyRequest::default())
            .await
            .unwrap_err();
        match err {
            PipelineError::UpstreamUnavailable { service, reason } => {
                assert_eq!(service, "text_source");
                assert!(reason.contains("Failed to read text: gone"));
                assert!(reason.contains("500"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_deadline_is_enforced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "text": "late" }))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let err = client_for(&server, 50)
            .call::<_, ReadTextResponse>("ReadText", &EmptyRequest::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("deadline"));
    }

    #[tokio::test]
    async fn test_invalid_body_is_upstream_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client_for(&server, 1000)
            .call::<_, ReadTextResponse>("ReadText", &EmptyRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.category(), "upstream_unavailable");
    }

    #[tokio::test]
    async fn test_connection_refused_is_upstream_failure() {
        // nothing listens on the discard port
        let client =
            RpcClient::new("analyzer", "http://127.0.0.1:9", &RpcConfig::default()).unwrap();
        let err = client
            .call::<_, ReadTextResponse>("AnalyzeText", &EmptyRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::UpstreamUnavailable { .. }));
    }

    #[test]
    fn test_invalid_base_url_is_configuration_error() {
        let err = RpcClient::new("storage", "not a url", &RpcConfig::default()).unwrap_err();
        assert_eq!(err.category(), "configuration");
    }
}
