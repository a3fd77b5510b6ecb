//! Records Gateway Library
//!
//! Bearer-token gate in front of a clinical records API, plus a resilient
//! client for its patients resource.

pub mod auth;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod upstream;

pub use auth::{AuthGuard, AuthOutcome, Claims};
pub use config::GatewayConfig;
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
pub use upstream::{ApiResult, PatientsClient};
