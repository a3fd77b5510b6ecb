//! Token validation failures and the uniform rejection response.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use serde::Serialize;
use thiserror::Error;

/// Message returned to every rejected caller.
pub const UNAUTHORIZED_MESSAGE: &str = "Invalid or missing token";

/// Reasons a bearer token is refused.
///
/// These are logged server-side only; callers always see the same 401 body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("no bearer token in Authorization header")]
    MissingToken,

    #[error("token is not a well-formed JWT")]
    MalformedToken,

    #[error("token signature does not match")]
    SignatureInvalid,

    #[error("token has expired")]
    TokenExpired,

    #[error("token algorithm is not HS256")]
    UnsupportedAlgorithm,

    #[error("token is missing required claim '{0}'")]
    MissingClaim(String),
}

impl AuthError {
    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingToken => "missing_token",
            Self::MalformedToken => "malformed_token",
            Self::SignatureInvalid => "signature_invalid",
            Self::TokenExpired => "token_expired",
            Self::UnsupportedAlgorithm => "unsupported_algorithm",
            Self::MissingClaim(_) => "missing_claim",
        }
    }
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature => Self::SignatureInvalid,
            ErrorKind::ExpiredSignature => Self::TokenExpired,
            ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName
            | ErrorKind::MissingAlgorithm => Self::UnsupportedAlgorithm,
            ErrorKind::MissingRequiredClaim(claim) => Self::MissingClaim(claim.clone()),
            _ => Self::MalformedToken,
        }
    }
}

/// Body of the 401 response.
#[derive(Debug, Serialize)]
pub struct UnauthorizedBody {
    pub error: &'static str,
    pub code: u16,
}

/// The single response every rejected request receives.
pub fn unauthorized_response() -> Response {
    let body = UnauthorizedBody {
        error: UNAUTHORIZED_MESSAGE,
        code: StatusCode::UNAUTHORIZED.as_u16(),
    };
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        unauthorized_response()
    }
}
