//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! auth guard / patients client / HTTP layers produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Request ID flows through spans via the HTTP trace layer
//! - Rejection reasons are logged, never returned to callers

pub mod logging;
pub mod metrics;
