//! Bearer token gate.
//!
//! # States
//! - Pending: request arrived, header not yet inspected
//! - Authorized: token verified, claims attached (terminal)
//! - Rejected: any validation failure (terminal)
//!
//! # State Transitions
//! ```text
//! Pending → Authorized: HS256 signature matches, exp in the future, required claims present
//! Pending → Rejected:   no token, bad encoding, wrong key, expired, other algorithm, missing claim
//! ```
//!
//! # Design Decisions
//! - Each request is evaluated from scratch; the guard holds only the key
//! - Validation is never retried
//! - Only HS256 is accepted, whatever the token header claims

use std::sync::Arc;

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde_json::{Map, Value};

use crate::auth::claims::Claims;
use crate::auth::error::AuthError;
use crate::config::{AuthConfig, MAX_LEEWAY_SECS};

/// Result of evaluating one request.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthOutcome {
    Authorized(Claims),
    Rejected(AuthError),
}

impl AuthOutcome {
    pub fn is_authorized(&self) -> bool {
        matches!(self, Self::Authorized(_))
    }

    pub fn claims(&self) -> Option<&Claims> {
        match self {
            Self::Authorized(claims) => Some(claims),
            Self::Rejected(_) => None,
        }
    }
}

impl From<Result<Claims, AuthError>> for AuthOutcome {
    fn from(result: Result<Claims, AuthError>) -> Self {
        match result {
            Ok(claims) => Self::Authorized(claims),
            Err(reason) => Self::Rejected(reason),
        }
    }
}

/// Verifies bearer tokens against the shared secret.
///
/// Cheap to clone; all clones share the same key.
#[derive(Clone)]
pub struct AuthGuard {
    inner: Arc<GuardInner>,
}

struct GuardInner {
    key: DecodingKey,
    validation: Validation,
    required_claims: Vec<String>,
}

impl std::fmt::Debug for AuthGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthGuard")
            .field("key", &"[REDACTED]")
            .field("leeway", &self.inner.validation.leeway)
            .field("required_claims", &self.inner.required_claims)
            .finish()
    }
}

impl AuthGuard {
    /// Build a guard from the startup configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = config.leeway_secs.min(MAX_LEEWAY_SECS);
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            inner: Arc::new(GuardInner {
                key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
                validation,
                required_claims: config.required_claims.clone(),
            }),
        }
    }

    /// Evaluate a raw `Authorization` header value.
    pub fn evaluate(&self, header: Option<&str>) -> AuthOutcome {
        match extract_token(header) {
            Some(token) => self.verify(token).into(),
            None => AuthOutcome::Rejected(AuthError::MissingToken),
        }
    }

    /// Verify a bare token and return its claims.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let data = decode::<Map<String, Value>>(token, &self.inner.key, &self.inner.validation)?;

        if let Some(missing) = self
            .inner
            .required_claims
            .iter()
            .find(|name| !data.claims.contains_key(name.as_str()))
        {
            return Err(AuthError::MissingClaim(missing.clone()));
        }

        Ok(Claims::new(data.claims))
    }
}

/// Last whitespace-separated segment of the header, if any.
///
/// `Bearer abc` and a bare `abc` both yield `abc`.
pub fn extract_token(header: Option<&str>) -> Option<&str> {
    header?.split_whitespace().last()
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;
    use std::time::{SystemTime, UNIX_EPOCH};

    const SECRET: &str = "unit-test-secret";

    fn now() -> u64 {
        SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs()
    }

    fn guard() -> AuthGuard {
        AuthGuard::new(&AuthConfig {
            jwt_secret: SECRET.into(),
            ..AuthConfig::default()
        })
    }

    fn sign(alg: Algorithm, secret: &str, payload: Value) -> String {
        encode(
            &Header::new(alg),
            &payload,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_extract_token() {
        assert_eq!(extract_token(Some("Bearer abc.def.ghi")), Some("abc.def.ghi"));
        assert_eq!(extract_token(Some("abc")), Some("abc"));
        assert_eq!(extract_token(Some("Bearer   spaced  ")), Some("spaced"));
        assert_eq!(extract_token(Some("   ")), None);
        assert_eq!(extract_token(Some("")), None);
        assert_eq!(extract_token(None), None);
    }

    #[test]
    fn test_valid_token_round_trips_claims() {
        let payload = json!({"sub": "user-1", "exp": now() + 600, "ward": ["a", "b"]});
        let token = sign(Algorithm::HS256, SECRET, payload.clone());

        let outcome = guard().evaluate(Some(&format!("Bearer {}", token)));
        assert!(outcome.is_authorized());
        assert_eq!(
            serde_json::to_value(outcome.claims().unwrap()).unwrap(),
            payload
        );
    }

    #[test]
    fn test_missing_header() {
        assert_eq!(
            guard().evaluate(None),
            AuthOutcome::Rejected(AuthError::MissingToken)
        );
        assert_eq!(
            guard().evaluate(Some("Bearer")).claims(),
            None
        );
    }

    #[test]
    fn test_wrong_secret() {
        let token = sign(Algorithm::HS256, "other-secret", json!({"exp": now() + 600}));
        assert_eq!(guard().verify(&token), Err(AuthError::SignatureInvalid));
    }

    #[test]
    fn test_expired() {
        let token = sign(Algorithm::HS256, SECRET, json!({"exp": now() - 600}));
        assert_eq!(guard().verify(&token), Err(AuthError::TokenExpired));
    }

    #[test]
    fn test_leeway_accepts_recent_expiry() {
        let guard = AuthGuard::new(&AuthConfig {
            jwt_secret: SECRET.into(),
            leeway_secs: 120,
            ..AuthConfig::default()
        });
        let token = sign(Algorithm::HS256, SECRET, json!({"exp": now() - 30}));
        assert!(guard.verify(&token).is_ok());
    }

    #[test]
    fn test_oversized_leeway_is_clamped() {
        let guard = AuthGuard::new(&AuthConfig {
            jwt_secret: SECRET.into(),
            leeway_secs: u64::MAX,
            ..AuthConfig::default()
        });
        assert_eq!(guard.inner.validation.leeway, MAX_LEEWAY_SECS);

        // 2100-01-01T00:00:00Z
        let token = sign(Algorithm::HS256, SECRET, json!({"exp": 4_102_444_800u64}));
        assert!(guard.evaluate(Some(&format!("Bearer {}", token))).is_authorized());

        let stale = sign(Algorithm::HS256, SECRET, json!({"exp": now() - 2 * MAX_LEEWAY_SECS}));
        assert_eq!(guard.verify(&stale), Err(AuthError::TokenExpired));
    }

    #[test]
    fn test_other_algorithm_rejected() {
        let token = sign(Algorithm::HS512, SECRET, json!({"exp": now() + 600}));
        assert_eq!(guard().verify(&token), Err(AuthError::UnsupportedAlgorithm));
    }

    #[test]
    fn test_garbage_is_malformed() {
        assert_eq!(guard().verify("not-a-jwt"), Err(AuthError::MalformedToken));
        assert_eq!(
            guard().evaluate(Some("Basic dXNlcjpwYXNz")),
            AuthOutcome::Rejected(AuthError::MalformedToken)
        );
    }

    #[test]
    fn test_missing_exp_fails_closed() {
        let token = sign(Algorithm::HS256, SECRET, json!({"sub": "user-1"}));
        assert_eq!(
            guard().verify(&token),
            Err(AuthError::MissingClaim("exp".into()))
        );
    }

    #[test]
    fn test_configured_required_claims() {
        let guard = AuthGuard::new(&AuthConfig {
            jwt_secret: SECRET.into(),
            required_claims: vec!["sub".into()],
            ..AuthConfig::default()
        });
        let token = sign(Algorithm::HS256, SECRET, json!({"exp": now() + 600}));
        assert_eq!(guard.verify(&token), Err(AuthError::MissingClaim("sub".into())));
    }

    #[test]
    fn test_debug_hides_key() {
        assert!(format!("{:?}", guard()).contains("[REDACTED]"));
    }
}
