use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};

use crate::auth::Claims;
use crate::http::request::request_id;
use crate::http::server::AppState;
use crate::upstream::ApiResult;

/// `GET /patients`: proxy the patient list through the resilient client.
pub async fn get_patients(
    State(state): State<AppState>,
    claims: Claims,
    headers: HeaderMap,
) -> ApiResult {
    tracing::debug!(
        request_id = %request_id(&headers),
        subject = ?claims.subject(),
        "Fetching patients"
    );
    state
        .client
        .fetch_patients_with_cancel(&state.shutdown.child_token())
        .await
}

/// `GET /session`: the caller's validated claims.
pub async fn get_session(claims: Claims) -> Json<Claims> {
    Json(claims)
}

/// Unmatched paths; only reachable past the guard.
pub async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}
