//! RPC response envelope
//!
//! Success is a plain 200 with the payload. Failure is a 500 whose body is the
//! default payload with an `error` object flattened next to it:
//!
//! ```json
//! { "text": "", "error": { "code": "INTERNAL", "message": "Failed to read text: ..." } }
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::constants::INTERNAL_ERROR_CODE;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcErrorBody {
    pub code: String,
    pub message: String,
}

impl RpcErrorBody {
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            code: INTERNAL_ERROR_CODE.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Serialize)]
struct FailureBody<T> {
    #[serde(flatten)]
    payload: T,
    error: RpcErrorBody,
}

/// Error half of a failed response, as read by clients
#[derive(Debug, Deserialize)]
pub(crate) struct FailureView {
    pub error: RpcErrorBody,
}

/// Outcome of an RPC handler
#[derive(Debug)]
pub enum RpcReply<T> {
    Ok(T),
    Failed { payload: T, detail: String },
}

impl<T> RpcReply<T> {
    pub fn ok(payload: T) -> Self {
        Self::Ok(payload)
    }

    /// Failure status carrying the safe default payload
    pub fn failed(payload: T, detail: impl Into<String>) -> Self {
        Self::Failed {
            payload,
            detail: detail.into(),
        }
    }
}

impl<T: Serialize> IntoResponse for RpcReply<T> {
    fn into_response(self) -> Response {
        match self {
            RpcReply::Ok(payload) => (StatusCode::OK, Json(payload)).into_response(),
            RpcReply::Failed { payload, detail } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(FailureBody {
                    payload,
                    error: RpcErrorBody::internal(detail),
                }),
            )
                .into_response(),
        }
    }
}
