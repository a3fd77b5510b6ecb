//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap a whole retry sequence with an optional deadline
//! - Cancel the wrapped future cleanly on expiry
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout errors are distinct from other errors
//! - Per-attempt timeouts live in the HTTP client, not here

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

/// The deadline passed before the future completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("deadline of {0:?} exceeded")]
pub struct DeadlineExceeded(pub Duration);

/// Await `fut`, giving up after `limit` when one is set.
pub async fn with_deadline<F>(limit: Option<Duration>, fut: F) -> Result<F::Output, DeadlineExceeded>
where
    F: Future,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| DeadlineExceeded(limit)),
        None => Ok(fut.await),
    }
}
