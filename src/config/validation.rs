//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, attempts >= 1)
//! - Check addresses and URLs parse
//! - Keep the worst-case upstream call inside the listener timeout
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::config::schema::{GatewayConfig, MAX_LEEWAY_SECS};
use crate::resilience::backoff::calculate_backoff;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }
    if config.listener.request_timeout_secs == 0 {
        errors.push(ValidationError::new("listener.request_timeout_secs", "must be > 0"));
    }

    if config.auth.jwt_secret.is_empty() {
        errors.push(ValidationError::new("auth.jwt_secret", "must not be empty"));
    }
    if config.auth.leeway_secs > MAX_LEEWAY_SECS {
        errors.push(ValidationError::new(
            "auth.leeway_secs",
            format!("must be <= {}", MAX_LEEWAY_SECS),
        ));
    }

    match Url::parse(&config.upstream.base_url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(ValidationError::new(
            "upstream.base_url",
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new("upstream.base_url", e.to_string())),
    }

    let has_encoded = config
        .upstream
        .basic_auth
        .as_deref()
        .is_some_and(|v| !v.is_empty());
    let has_pair = config.upstream.username.is_some() && config.upstream.password.is_some();
    if !has_encoded && !has_pair {
        errors.push(ValidationError::new(
            "upstream.basic_auth",
            "either basic_auth or username and password must be set",
        ));
    }
    if config.upstream.connect_timeout_ms == 0 {
        errors.push(ValidationError::new("upstream.connect_timeout_ms", "must be > 0"));
    }
    if config.upstream.request_timeout_ms == 0 {
        errors.push(ValidationError::new("upstream.request_timeout_ms", "must be > 0"));
    }
    if config.upstream.overall_timeout_ms == Some(0) {
        errors.push(ValidationError::new("upstream.overall_timeout_ms", "must be > 0 when set"));
    }

    let retries = &config.retries;
    if retries.max_attempts == 0 {
        errors.push(ValidationError::new("retries.max_attempts", "must be >= 1"));
    }
    if !(retries.backoff_factor >= 1.0 && retries.backoff_factor.is_finite()) {
        errors.push(ValidationError::new("retries.backoff_factor", "must be a finite value >= 1.0"));
    }
    if retries.max_delay_ms < retries.base_delay_ms {
        errors.push(ValidationError::new("retries.max_delay_ms", "must be >= base_delay_ms"));
    }
    if !(0.0..=1.0).contains(&retries.jitter_ratio) {
        errors.push(ValidationError::new("retries.jitter_ratio", "must be within 0.0..=1.0"));
    }

    if config.listener.request_timeout_secs > 0 {
        let budget_ms = u128::from(config.listener.request_timeout_secs) * 1_000;
        let worst_ms = worst_case_upstream_ms(config);
        if worst_ms >= budget_ms {
            let field = if config.upstream.overall_timeout_ms.is_some() {
                "upstream.overall_timeout_ms"
            } else {
                "upstream.request_timeout_ms"
            };
            errors.push(ValidationError::new(
                field,
                format!(
                    "worst-case upstream time {}ms must be below listener.request_timeout_secs ({}ms)",
                    worst_ms, budget_ms
                ),
            ));
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Longest a single patients fetch can take: every attempt timing out plus
/// every backoff at full jitter, capped by the overall deadline when set.
fn worst_case_upstream_ms(config: &GatewayConfig) -> u128 {
    let retries = &config.retries;
    let attempts = retries.max_attempts.max(1);
    let base = Duration::from_millis(retries.base_delay_ms);
    let max = Duration::from_millis(retries.max_delay_ms.max(retries.base_delay_ms));
    let jitter = if retries.jitter_ratio.is_finite() {
        retries.jitter_ratio.clamp(0.0, 1.0)
    } else {
        1.0
    };

    let jittered = |delay: Duration| {
        let ms = delay.as_millis();
        ms + (ms as f64 * jitter).ceil() as u128
    };

    let mut total = u128::from(attempts) * u128::from(config.upstream.request_timeout_ms);
    for index in 0..attempts - 1 {
        let delay = calculate_backoff(index, base, retries.backoff_factor, max);
        if delay == max {
            // Every remaining delay sits at the cap.
            total += u128::from(attempts - 1 - index) * jittered(max);
            break;
        }
        total += jittered(delay);
    }

    match config.upstream.overall_timeout_ms {
        Some(overall) => total.min(u128::from(overall)),
        None => total,
    }
}
