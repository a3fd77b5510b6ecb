//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_auth_decisions_total` (counter): guard outcomes by `outcome`
//! - `gateway_upstream_attempts_total` (counter): individual upstream attempts by `outcome`
//! - `gateway_upstream_calls_total` (counter): resolved client calls by `result`
//! - `gateway_upstream_call_duration_seconds` (histogram): latency of a whole call, retries included
//!
//! Without an installed recorder every call here is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder with its own HTTP listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Count one guard decision (`authorized` or `rejected`).
pub fn record_auth_decision(outcome: &'static str) {
    counter!("gateway_auth_decisions_total", "outcome" => outcome).increment(1);
}

/// Count one upstream attempt (`success`, `retryable`, `fatal`).
pub fn record_upstream_attempt(outcome: &'static str) {
    counter!("gateway_upstream_attempts_total", "outcome" => outcome).increment(1);
}

/// Count a resolved client call and record its total latency.
pub fn record_upstream_call(result: &'static str, start: Instant) {
    counter!("gateway_upstream_calls_total", "result" => result).increment(1);
    histogram!("gateway_upstream_call_duration_seconds", "result" => result)
        .record(start.elapsed().as_secs_f64());
}
