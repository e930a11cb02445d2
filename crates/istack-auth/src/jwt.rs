//! JWT issuance and verification for session tokens.
//!
//! Access tokens carry the [`TokenClaims`] of a session plus the registered
//! `iat` and `exp` claims, signed with HS256.
//!
//! # Example
//!
//! ```ignore
//! use istack_auth::{Session, create_access_token, verify_token};
//! use istack_config::JwtConfig;
//!
//! let config = JwtConfig::from_env();
//! let session = Session::new(Some("user-id".to_string()), [("acme", ["app"])], None);
//!
//! let token = create_access_token(&session, &config)?;
//! let claims = verify_token(&token, &config)?;
//! assert_eq!(claims.identity.as_deref(), Some("user-id"));
//! ```

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::Serialize;

use istack_config::JwtConfig;
use istack_core::AppError;

use crate::claims::TokenClaims;
use crate::error::AuthenticationFailure;
use crate::session::Session;

/// Session claims together with the registered timestamp claims.
#[derive(Debug, Serialize)]
struct AccessTokenClaims<'a> {
    #[serde(flatten)]
    session: &'a TokenClaims,
    /// Token expiration timestamp (Unix timestamp)
    exp: usize,
    /// Token issued-at timestamp (Unix timestamp)
    iat: usize,
}

/// Signs an access token that carries `session`.
///
/// # Errors
///
/// Returns an internal error if token encoding fails.
pub fn create_access_token(session: &Session, jwt_config: &JwtConfig) -> Result<String, AppError> {
    let now = Utc::now().timestamp() as usize;
    let exp = now + jwt_config.access_token_expiry.max(0) as usize;

    let session_claims = session.to_claims();
    let claims = AccessTokenClaims {
        session: &session_claims,
        exp,
        iat: now,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(|e| AppError::internal_error(format!("Failed to create token: {}", e)))
}

/// Verifies signature and expiry of `token` and decodes its session claims.
///
/// # Errors
///
/// - [`AuthenticationFailure::InvalidToken`] for a bad signature, an expired
///   or an undecodable token
/// - [`AuthenticationFailure::Malformed`] when the payload is not a
///   serialized session
pub fn verify_token(token: &str, jwt_config: &JwtConfig) -> Result<TokenClaims, AuthenticationFailure> {
    let mut validation = Validation::default();
    validation.leeway = jwt_config.leeway;

    let payload = decode::<serde_json::Value>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| AuthenticationFailure::InvalidToken)?;

    Ok(TokenClaims::from_value(payload)?)
}

/// Verifies `token` and rebuilds the session it carries.
pub fn decode_session(token: &str, jwt_config: &JwtConfig) -> Result<Session, AuthenticationFailure> {
    let claims = verify_token(token, jwt_config)?;
    Ok(Session::from_claims(claims)?)
}
