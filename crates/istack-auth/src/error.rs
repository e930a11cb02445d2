//! Error types for session decoding, authentication and authorization.

use std::collections::BTreeSet;

use thiserror::Error;

/// Token claims did not have the structure of a serialized session.
#[derive(Debug, Error)]
pub enum MalformedTokenError {
    /// A required field is missing or has the wrong type.
    #[error("malformed token claims: {0}")]
    Shape(#[from] serde_json::Error),

    /// `identity` and `sub` must carry the same value.
    #[error("token identity {identity:?} does not match subject {sub:?}")]
    IdentityMismatch {
        identity: Option<String>,
        sub: Option<String>,
    },
}

/// The request could not be authenticated ("not logged in").
#[derive(Debug, Error)]
pub enum AuthenticationFailure {
    #[error("Missing authorization header")]
    MissingToken,

    #[error("Invalid authorization header format")]
    InvalidHeader,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Invalid token claims: {0}")]
    Malformed(#[from] MalformedTokenError),
}

/// The session is authenticated but lacks every admitted role.
#[derive(Debug, Error)]
#[error("Access denied. The session doesn't have any of the required roles: {}", format_roles(.admitted_roles))]
pub struct AuthorizationFailure {
    pub admitted_roles: BTreeSet<String>,
}

fn format_roles(roles: &BTreeSet<String>) -> String {
    if roles.is_empty() {
        return "<organization membership>".to_string();
    }
    roles.iter().cloned().collect::<Vec<_>>().join(", ")
}
