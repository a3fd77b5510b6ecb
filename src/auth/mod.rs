//! Inbound authentication subsystem.
//!
//! # Data Flow
//! ```text
//! Authorization: Bearer <token>
//!     → middleware.rs (read header, call guard)
//!     → guard.rs (extract last segment, HS256 verify, exp check)
//!     → Authorized: claims.rs (Claims inserted into request extensions) → handler
//!     → Rejected: error.rs (uniform 401 JSON, reason logged only)
//! ```

pub mod claims;
pub mod error;
pub mod guard;
pub mod middleware;

pub use claims::Claims;
pub use error::{unauthorized_response, AuthError, UNAUTHORIZED_MESSAGE};
pub use guard::{extract_token, AuthGuard, AuthOutcome};
pub use middleware::auth_guard_middleware;
