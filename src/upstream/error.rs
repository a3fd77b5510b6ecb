//! Upstream call failures.

use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

use crate::resilience::retries::{is_retryable_status, Retryable};

/// Everything that can go wrong talking to the records service.
///
/// Never leaves the client as an error; it is folded into
/// [`ApiResult::Failure`](crate::upstream::ApiResult::Failure).
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Connection refused, reset, DNS failure, body cut short.
    #[error("connection to upstream failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// A single attempt ran past its timeout.
    #[error("upstream did not respond within {0:?}")]
    Timeout(Duration),

    /// Non-2xx response.
    #[error("the server responded with status {}", .status.as_u16())]
    Status { status: StatusCode },

    /// 2xx response whose body is not JSON.
    #[error("failed to parse upstream response as JSON: {0}")]
    Decode(#[from] serde_json::Error),

    /// The request could not be built (bad URL, bad credential).
    #[error("invalid upstream request: {0}")]
    InvalidRequest(String),

    /// The caller cancelled the call.
    #[error("upstream call cancelled")]
    Cancelled,

    /// The whole retry sequence ran past its deadline.
    #[error("upstream call exceeded deadline of {0:?}")]
    DeadlineExceeded(Duration),
}

impl UpstreamError {
    /// Classify a `reqwest` failure from `send` or body reads.
    pub fn from_reqwest(err: reqwest::Error, attempt_timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout(attempt_timeout)
        } else if err.is_builder() {
            Self::InvalidRequest(err.to_string())
        } else {
            Self::Transport(err)
        }
    }
}

impl Retryable for UpstreamError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout(_) => true,
            Self::Status { status } => is_retryable_status(*status),
            Self::Decode(_) | Self::InvalidRequest(_) | Self::Cancelled | Self::DeadlineExceeded(_) => {
                false
            }
        }
    }
}
