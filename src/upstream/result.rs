//! Terminal result of a patients call.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

use crate::upstream::error::UpstreamError;

/// Code attached to every upstream failure.
pub const UPSTREAM_FAILURE_CODE: u16 = 502;

/// Either the parsed body or a shaped error. Never both, never neither.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResult {
    Success(Value),
    Failure { code: u16, message: String },
}

/// Wire shape of a failure: `{"error": ..., "code": 502}`.
#[derive(Debug, Serialize)]
pub struct FailureBody<'a> {
    pub error: &'a str,
    pub code: u16,
}

impl ApiResult {
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure {
            code: UPSTREAM_FAILURE_CODE,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn data(&self) -> Option<&Value> {
        match self {
            Self::Success(value) => Some(value),
            Self::Failure { .. } => None,
        }
    }

    /// Payload for `Success`, error object for `Failure`.
    pub fn into_json(self) -> Value {
        match self {
            Self::Success(value) => value,
            Self::Failure { code, message } => serde_json::json!({
                "error": message,
                "code": code,
            }),
        }
    }
}

impl From<UpstreamError> for ApiResult {
    fn from(err: UpstreamError) -> Self {
        Self::failure(err.to_string())
    }
}

impl From<Result<Value, UpstreamError>> for ApiResult {
    fn from(result: Result<Value, UpstreamError>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(err) => err.into(),
        }
    }
}

impl IntoResponse for ApiResult {
    fn into_response(self) -> Response {
        match self {
            Self::Success(value) => (StatusCode::OK, Json(value)).into_response(),
            Self::Failure { code, message } => {
                let status = StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_GATEWAY);
                let body = FailureBody {
                    error: &message,
                    code,
                };
                (status, Json(body)).into_response()
            }
        }
    }
}
