//! Outbound calls to the clinical records API.
//!
//! # Data Flow
//! ```text
//! handler
//!     → client.rs (GET patients, Accept + Basic headers)
//!     → resilience (retry with backoff, optional deadline, cancellation)
//!     → error.rs (classify each failure)
//!     → result.rs (ApiResult: parsed JSON or {"error", "code": 502})
//! ```

pub mod client;
pub mod error;
pub mod result;

pub use client::PatientsClient;
pub use error::UpstreamError;
pub use result::{ApiResult, UPSTREAM_FAILURE_CODE};
