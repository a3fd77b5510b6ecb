//! Axum middleware that runs the guard on every request.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::auth::error::unauthorized_response;
use crate::auth::guard::{AuthGuard, AuthOutcome};
use crate::observability::metrics;

/// Validate the bearer token; attach claims and continue, or answer 401.
///
/// Mount with `axum::middleware::from_fn_with_state(guard, auth_guard_middleware)`.
pub async fn auth_guard_middleware(
    State(guard): State<AuthGuard>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    match guard.evaluate(auth_header) {
        AuthOutcome::Authorized(claims) => {
            metrics::record_auth_decision("authorized");
            tracing::debug!(subject = ?claims.subject(), "Bearer token accepted");
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        AuthOutcome::Rejected(reason) => {
            metrics::record_auth_decision("rejected");
            tracing::warn!(
                reason = reason.kind(),
                detail = %reason,
                path = %request.uri().path(),
                "Authentication failed"
            );
            unauthorized_response()
        }
    }
}
