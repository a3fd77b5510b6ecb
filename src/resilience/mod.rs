//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Outbound call:
//!     → timeouts.rs (optional deadline for the whole sequence)
//!     → retries.rs (classify failure, retry with backoff, honour cancellation)
//!     → backoff.rs (per-call RetryState: attempt counter + growing delay)
//! ```
//!
//! # Design Decisions
//! - Every attempt has a deadline (per-attempt timeout lives in the HTTP client)
//! - Only the patients GET is retried; it is idempotent
//! - Retry state is per call, never shared

pub mod backoff;
pub mod retries;
pub mod timeouts;

pub use backoff::{RetryPolicy, RetryState};
pub use retries::{is_retryable_status, retry_with_backoff, RetryError, Retryable};
pub use timeouts::{with_deadline, DeadlineExceeded};
