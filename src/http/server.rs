//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, timeout, request ID, auth guard)
//! - Bind server to listener
//! - Stop accepting and cancel in-flight upstream calls on shutdown

use std::time::Duration;

use axum::{middleware::from_fn_with_state, routing::get, Router};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::auth::{auth_guard_middleware, AuthGuard};
use crate::config::GatewayConfig;
use crate::http::handlers::{get_patients, get_session, not_found};
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};
use crate::upstream::{PatientsClient, UpstreamError};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub client: PatientsClient,
    /// Parent of every per-request cancellation token.
    pub shutdown: CancellationToken,
}

/// HTTP server for the gateway.
pub struct GatewayServer {
    router: Router,
    config: GatewayConfig,
    shutdown: CancellationToken,
}

impl GatewayServer {
    /// Create a new server with the given configuration.
    pub fn new(config: GatewayConfig, shutdown: CancellationToken) -> Result<Self, UpstreamError> {
        let guard = AuthGuard::new(&config.auth);
        let client = PatientsClient::new(&config.upstream, &config.retries)?;

        let state = AppState {
            client,
            shutdown: shutdown.clone(),
        };

        let router = build_router(&config, guard, state);
        Ok(Self {
            router,
            config,
            shutdown,
        })
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        let shutdown = self.shutdown.clone();
        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// The assembled router, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

/// Build the Axum router with all middleware layers.
///
/// The guard wraps every route and the fallback, so each request passes it once.
#[allow(deprecated)]
pub fn build_router(config: &GatewayConfig, guard: AuthGuard, state: AppState) -> Router {
    Router::new()
        .route("/patients", get(get_patients))
        .route("/session", get(get_session))
        .fallback(not_found)
        .with_state(state)
        .layer(from_fn_with_state(guard, auth_guard_middleware))
        .layer(TimeoutLayer::new(Duration::from_secs(config.listener.request_timeout_secs)))
        .layer(propagate_request_id_layer())
        .layer(TraceLayer::new_for_http().make_span_with(
            |request: &axum::http::Request<axum::body::Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    path = %request.uri().path(),
                    request_id = %request_id(request.headers()),
                )
            },
        ))
        .layer(set_request_id_layer())
}
