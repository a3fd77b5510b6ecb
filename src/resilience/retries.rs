//! Retry logic.
//!
//! # Responsibilities
//! - Classify failures as retryable or fatal
//! - Execute retries with exponential backoff
//! - Stop promptly when the caller cancels
//!
//! # Design Decisions
//! - Fatal failures return immediately without consuming retry budget
//! - Connection errors always retryable; 5xx, 408 and 429 retryable
//! - Sleeping between attempts suspends only the calling task

use std::fmt::Display;
use std::future::Future;

use reqwest::StatusCode;
use tokio_util::sync::CancellationToken;

use crate::resilience::backoff::{RetryPolicy, RetryState};

/// Errors that know whether another attempt could succeed.
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

/// Why a retried operation gave up.
#[derive(Debug)]
pub enum RetryError<E> {
    /// Every attempt failed with a retryable error.
    Exhausted { last: E, attempts: u32 },
    /// An attempt failed with a non-retryable error.
    Fatal { error: E, attempts: u32 },
    /// The cancellation token fired.
    Cancelled { attempts: u32 },
}

impl<E> RetryError<E> {
    /// Attempts started before giving up.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Exhausted { attempts, .. }
            | Self::Fatal { attempts, .. }
            | Self::Cancelled { attempts } => *attempts,
        }
    }
}

/// Whether an HTTP status is worth another attempt.
pub fn is_retryable_status(status: StatusCode) -> bool {
    status.is_server_error()
        || status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
}

/// Run `op` under `policy`, retrying retryable failures with backoff.
///
/// `op` receives the 0-based attempt index.
pub async fn retry_with_backoff<T, E, F, Fut>(
    policy: &RetryPolicy,
    cancel: &CancellationToken,
    mut op: F,
) -> Result<T, RetryError<E>>
where
    E: Retryable + Display,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut state = RetryState::new(policy);

    loop {
        if cancel.is_cancelled() {
            return Err(RetryError::Cancelled { attempts: state.attempts() });
        }

        let index = state.begin_attempt();
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(RetryError::Cancelled { attempts: state.attempts() });
            }
            outcome = op(index) => outcome,
        };

        match outcome {
            Ok(value) => return Ok(value),
            Err(error) if !error.is_retryable() => {
                tracing::debug!(attempt = index + 1, error = %error, "Non-retryable failure");
                return Err(RetryError::Fatal {
                    error,
                    attempts: state.attempts(),
                });
            }
            Err(last) if !state.can_retry() => {
                tracing::debug!(attempts = state.attempts(), error = %last, "Retry budget exhausted");
                return Err(RetryError::Exhausted {
                    last,
                    attempts: state.attempts(),
                });
            }
            Err(error) => {
                let delay = state.next_delay();
                tracing::warn!(
                    attempt = index + 1,
                    max_attempts = policy.max_attempts,
                    delay = ?delay,
                    error = %error,
                    "Attempt failed, retrying"
                );
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        return Err(RetryError::Cancelled { attempts: state.attempts() });
                    }
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::time::Instant;

    #[derive(Debug)]
    struct TestError {
        retryable: bool,
    }

    impl Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "test error (retryable: {})", self.retryable)
        }
    }

    impl Retryable for TestError {
        fn is_retryable(&self) -> bool {
            self.retryable
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_on_third_attempt_with_backoff() {
        let policy = RetryPolicy::default();
        let cancel = CancellationToken::new();
        let started = Arc::new(Mutex::new(Vec::new()));
        let log = started.clone();

        let begin = Instant::now();
        let result = retry_with_backoff(&policy, &cancel, |index| {
            log.lock().unwrap().push(Instant::now());
            async move {
                if index < 2 {
                    Err(TestError { retryable: true })
                } else {
                    Ok("done")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "done");
        let started = started.lock().unwrap();
        assert_eq!(started.len(), 3);
        let first_gap = started[1] - started[0];
        let second_gap = started[2] - started[1];
        assert!(first_gap >= Duration::from_millis(100) && first_gap < Duration::from_millis(105));
        assert!(second_gap >= Duration::from_millis(200) && second_gap < Duration::from_millis(205));
        assert!(begin.elapsed() < Duration::from_millis(310));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausts_budget() {
        let policy = RetryPolicy::default();
        let cancel = CancellationToken::new();
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = retry_with_backoff(&policy, &cancel, |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(TestError { retryable: true }) }
        })
        .await;

        match result {
            Err(RetryError::Exhausted { attempts, .. }) => assert_eq!(attempts, 3),
            other => panic!("expected exhaustion, got {:?}", other),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fatal_error_is_not_retried() {
        let policy = RetryPolicy::default();
        let cancel = CancellationToken::new();
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = retry_with_backoff(&policy, &cancel, |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(TestError { retryable: false }) }
        })
        .await;

        assert!(matches!(result, Err(RetryError::Fatal { attempts: 1, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_backoff_stops_retrying() {
        let policy = RetryPolicy {
            base_delay: Duration::from_secs(10),
            max_delay: Duration::from_secs(10),
            ..RetryPolicy::default()
        };
        let cancel = CancellationToken::new();
        let calls = Arc::new(AtomicU32::new(0));

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            trigger.cancel();
        });

        let counter = calls.clone();
        let result: Result<(), _> = retry_with_backoff(&policy, &cancel, |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Err(TestError { retryable: true }) }
        })
        .await;

        assert!(matches!(result, Err(RetryError::Cancelled { attempts: 1 })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_already_cancelled_makes_no_attempt() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result: Result<(), RetryError<TestError>> =
            retry_with_backoff(&RetryPolicy::default(), &cancel, |_| async { Ok(()) }).await;

        assert_eq!(result.unwrap_err().attempts(), 0);
    }

    #[test]
    fn test_status_classification() {
        assert!(is_retryable_status(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(is_retryable_status(StatusCode::SERVICE_UNAVAILABLE));
        assert!(is_retryable_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_retryable_status(StatusCode::REQUEST_TIMEOUT));
        assert!(!is_retryable_status(StatusCode::NOT_FOUND));
        assert!(!is_retryable_status(StatusCode::UNAUTHORIZED));
        assert!(!is_retryable_status(StatusCode::OK));
    }
}
