//! Resilient client for the patients resource.
//!
//! # Responsibilities
//! - Issue `GET <base_url>/api/v1/patients` with Accept and Basic headers
//! - Retry transient failures with exponential backoff
//! - Fold every failure into `ApiResult::Failure` (code 502)
//!
//! # Design Decisions
//! - Connection pool is shared across clones; retry state is per call
//! - Per-attempt timeout set on the `reqwest::Client`
//! - Cancellation and the overall deadline stop the sequence between awaits

use std::time::{Duration, Instant};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::config::{RetryConfig, UpstreamConfig};
use crate::observability::metrics;
use crate::resilience::backoff::RetryPolicy;
use crate::resilience::retries::{retry_with_backoff, RetryError, Retryable};
use crate::resilience::timeouts::{with_deadline, DeadlineExceeded};
use crate::upstream::error::UpstreamError;
use crate::upstream::result::ApiResult;

/// Outbound client for the records service.
#[derive(Debug, Clone)]
pub struct PatientsClient {
    http: reqwest::Client,
    endpoint: Url,
    policy: RetryPolicy,
    attempt_timeout: Duration,
    overall_timeout: Option<Duration>,
}

impl PatientsClient {
    /// Build a client from startup configuration.
    pub fn new(upstream: &UpstreamConfig, retries: &RetryConfig) -> Result<Self, UpstreamError> {
        let endpoint = build_endpoint(&upstream.base_url, &upstream.patients_path)?;
        let credential = resolve_credential(upstream)?;
        let attempt_timeout = Duration::from_millis(upstream.request_timeout_ms);

        let mut authorization = HeaderValue::from_str(&format!("Basic {}", credential))
            .map_err(|_| UpstreamError::InvalidRequest("credential is not a valid header value".into()))?;
        authorization.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(AUTHORIZATION, authorization);

        let http = reqwest::Client::builder()
            .timeout(attempt_timeout)
            .connect_timeout(Duration::from_millis(upstream.connect_timeout_ms))
            .default_headers(headers)
            .build()
            .map_err(|e| UpstreamError::InvalidRequest(e.to_string()))?;

        tracing::info!(
            endpoint = %endpoint,
            max_attempts = retries.max_attempts,
            base_delay_ms = retries.base_delay_ms,
            "Patients client initialized"
        );

        Ok(Self {
            http,
            endpoint,
            policy: RetryPolicy::from(retries),
            attempt_timeout,
            overall_timeout: upstream.overall_timeout_ms.map(Duration::from_millis),
        })
    }

    /// Full URL of the patients resource.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetch the patient list. Always resolves; never panics on upstream faults.
    pub async fn fetch_patients(&self) -> ApiResult {
        self.fetch_patients_with_cancel(&CancellationToken::new()).await
    }

    /// Like [`fetch_patients`](Self::fetch_patients), but stops when `cancel` fires.
    pub async fn fetch_patients_with_cancel(&self, cancel: &CancellationToken) -> ApiResult {
        let start = Instant::now();
        let call = retry_with_backoff(&self.policy, cancel, |index| self.attempt(index));

        let result = match with_deadline(self.overall_timeout, call).await {
            Ok(Ok(value)) => ApiResult::Success(value),
            Ok(Err(RetryError::Exhausted { last, attempts })) => {
                tracing::error!(attempts, error = %last, "Patients call failed after retries");
                last.into()
            }
            Ok(Err(RetryError::Fatal { error, attempts })) => {
                tracing::error!(attempts, error = %error, "Patients call failed");
                error.into()
            }
            Ok(Err(RetryError::Cancelled { attempts })) => {
                tracing::info!(attempts, "Patients call cancelled");
                UpstreamError::Cancelled.into()
            }
            Err(DeadlineExceeded(limit)) => {
                tracing::error!(deadline = ?limit, "Patients call exceeded its deadline");
                UpstreamError::DeadlineExceeded(limit).into()
            }
        };

        metrics::record_upstream_call(if result.is_success() { "success" } else { "failure" }, start);
        result
    }

    async fn attempt(&self, index: u32) -> Result<Value, UpstreamError> {
        let result = self.send_once().await;
        let outcome = match &result {
            Ok(_) => "success",
            Err(e) if e.is_retryable() => "retryable",
            Err(_) => "fatal",
        };
        metrics::record_upstream_attempt(outcome);
        tracing::debug!(attempt = index + 1, outcome, "Patients attempt finished");
        result
    }

    async fn send_once(&self) -> Result<Value, UpstreamError> {
        let response = self
            .http
            .get(self.endpoint.clone())
            .send()
            .await
            .map_err(|e| UpstreamError::from_reqwest(e, self.attempt_timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status { status });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| UpstreamError::from_reqwest(e, self.attempt_timeout))?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Join the base URL and resource path with exactly one slash.
pub fn build_endpoint(base_url: &str, path: &str) -> Result<Url, UpstreamError> {
    let joined = format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    Url::parse(&joined).map_err(|e| UpstreamError::InvalidRequest(format!("{}: {}", joined, e)))
}

/// The value that follows `Basic ` in the Authorization header.
pub fn resolve_credential(upstream: &UpstreamConfig) -> Result<String, UpstreamError> {
    if let Some(encoded) = upstream.basic_auth.as_deref().filter(|v| !v.is_empty()) {
        return Ok(encoded.to_string());
    }
    match (&upstream.username, &upstream.password) {
        (Some(user), Some(pass)) => Ok(STANDARD.encode(format!("{}:{}", user, pass))),
        _ => Err(UpstreamError::InvalidRequest("no upstream credential configured".into())),
    }
}
