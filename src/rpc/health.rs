//! # Health Check Handlers
//!
//! `GET /health` on every service. Returns OK whenever the process is serving.

use axum::Json;
use serde::Serialize;

/// Basic health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl HealthResponse {
    pub fn ok(service: &str) -> Self {
        Self {
            status: "ok".to_string(),
            service: service.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Handler factory for services without extra health details
pub fn basic_health(
    service: &'static str,
) -> impl Fn() -> std::future::Ready<Json<HealthResponse>> + Clone + Send + Sync + 'static {
    move || std::future::ready(Json(HealthResponse::ok(service)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_details_are_omitted_when_absent() {
        let json = serde_json::to_value(HealthResponse::ok("analyzer")).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["service"], "analyzer");
        assert!(json.get("details").is_none());
    }
}
