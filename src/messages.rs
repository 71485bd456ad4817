//! Request and response payloads for the four RPC methods.
//!
//! `AnalyzeText` responds with [`crate::analysis::AnalysisResult`] directly.
//! Every type here has a `Default` that doubles as the safe payload sent
//! alongside a failure status.

use serde::{Deserialize, Serialize};

/// Body of methods that take no arguments
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyRequest {}

/// `ReadText` response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadTextResponse {
    pub text: String,
}

/// `AnalyzeText` request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeTextRequest {
    #[serde(default)]
    pub tracked_terms: Vec<String>,
}

/// `GetData` response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataResponse {
    pub found: bool,
    pub data: String,
}

impl DataResponse {
    pub fn found(data: impl Into<String>) -> Self {
        Self {
            found: true,
            data: data.into(),
        }
    }

    pub fn not_found() -> Self {
        Self::default()
    }
}

/// `GetDisplayData` response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_analyze_request_uses_camel_case() {
        let request = AnalyzeTextRequest {
            tracked_terms: vec!["thou".to_string()],
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({ "trackedTerms": ["thou"] })
        );
    }

    #[test]
    fn test_analyze_request_tolerates_missing_terms() {
        let request: AnalyzeTextRequest = serde_json::from_value(json!({})).unwrap();
        assert!(request.tracked_terms.is_empty());
    }

    #[test]
    fn test_not_found_is_empty() {
        let response = DataResponse::not_found();
        assert!(!response.found);
        assert!(response.data.is_empty());
    }
}
