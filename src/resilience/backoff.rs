//! Exponential backoff with optional jitter.

use std::time::Duration;

use rand::Rng;

use crate::config::RetryConfig;

/// Immutable retry parameters shared by every call of one client.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Multiplier applied after each retry.
    pub backoff_factor: f64,
    /// Cap for a single delay.
    pub max_delay: Duration,
    /// Fraction of the delay added as random jitter.
    pub jitter_ratio: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: Duration::from_millis(config.base_delay_ms),
            // NaN.max(1.0) is 1.0, so a bad factor degrades to constant backoff.
            backoff_factor: config.backoff_factor.max(1.0),
            max_delay: Duration::from_millis(config.max_delay_ms.max(config.base_delay_ms)),
            jitter_ratio: config.jitter_ratio.clamp(0.0, 1.0),
        }
    }
}

/// Calculate `base × factor^attempt_index`, capped at `max`.
pub fn calculate_backoff(attempt_index: u32, base: Duration, factor: f64, max: Duration) -> Duration {
    let exponent = i32::try_from(attempt_index).unwrap_or(i32::MAX);
    let secs = base.as_secs_f64() * factor.max(1.0).powi(exponent);
    if !secs.is_finite() || secs >= max.as_secs_f64() {
        return max;
    }
    Duration::from_secs_f64(secs)
}

/// Add up to `ratio × delay` of random jitter.
pub fn apply_jitter(delay: Duration, ratio: f64) -> Duration {
    if ratio <= 0.0 || delay.is_zero() {
        return delay;
    }
    let extra = rand::thread_rng().gen_range(0.0..=ratio.min(1.0));
    delay + delay.mul_f64(extra)
}

/// Per-call retry bookkeeping.
///
/// Created fresh for every outbound call and dropped when it resolves.
#[derive(Debug, Clone)]
pub struct RetryState {
    attempts: u32,
    delays_taken: u32,
    max_attempts: u32,
    base_delay: Duration,
    backoff_factor: f64,
    max_delay: Duration,
    jitter_ratio: f64,
}

impl RetryState {
    pub fn new(policy: &RetryPolicy) -> Self {
        Self {
            attempts: 0,
            delays_taken: 0,
            max_attempts: policy.max_attempts.max(1),
            base_delay: policy.base_delay,
            backoff_factor: policy.backoff_factor.max(1.0),
            max_delay: policy.max_delay,
            jitter_ratio: policy.jitter_ratio,
        }
    }

    /// Attempts started so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Record the start of an attempt and return its 0-based index.
    pub fn begin_attempt(&mut self) -> u32 {
        debug_assert!(self.attempts < self.max_attempts, "attempt budget exceeded");
        let index = self.attempts;
        self.attempts = (self.attempts + 1).min(self.max_attempts);
        index
    }

    /// Whether another attempt fits in the budget.
    pub fn can_retry(&self) -> bool {
        self.attempts < self.max_attempts
    }

    /// Delay to wait before the next attempt; advances to the following step.
    pub fn next_delay(&mut self) -> Duration {
        let delay = calculate_backoff(
            self.delays_taken,
            self.base_delay,
            self.backoff_factor,
            self.max_delay,
        );
        self.delays_taken = self.delays_taken.saturating_add(1);
        apply_jitter(delay, self.jitter_ratio)
    }
}
