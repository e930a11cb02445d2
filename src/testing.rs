//! Helpers for tests of guarded routes.
//!
//! Available in unit tests and, with the `test-utils` feature, to the
//! integration tests under `tests/`.

use axum::http::HeaderValue;

use istack_auth::{AuthenticationFailure, Session, TokenClaims, create_access_token};
use istack_config::JwtConfig;

use crate::middleware::auth::TokenVerifier;
use crate::state::AppState;

pub const TEST_JWT_SECRET: &str = "test-secret-key-for-testing-only";

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: TEST_JWT_SECRET.to_string(),
        ..JwtConfig::default()
    }
}

pub fn test_state() -> AppState {
    AppState::new(test_jwt_config())
}

/// Signs a token for `session`. Panics if signing fails.
pub fn issue_token(session: &Session, config: &JwtConfig) -> String {
    create_access_token(session, config).expect("Failed to create test token")
}

pub fn bearer_header(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {}", token)).expect("Invalid bearer header value")
}

/// Verifier that accepts any token and returns fixed claims.
#[derive(Debug, Clone)]
pub struct StaticVerifier {
    pub claims: TokenClaims,
}

impl StaticVerifier {
    pub fn new(session: &Session) -> Self {
        Self {
            claims: session.to_claims(),
        }
    }
}

impl TokenVerifier for StaticVerifier {
    fn verify(&self, _token: &str) -> Result<TokenClaims, AuthenticationFailure> {
        Ok(self.claims.clone())
    }
}

/// Makes every bearer token presented to `state` decode to `session`.
pub fn inject_session(state: AppState, session: &Session) -> AppState {
    state.with_verifier(StaticVerifier::new(session))
}
