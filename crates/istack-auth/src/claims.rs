//! Token claims codec.
//!
//! Maps a [`Session`] to the claims embedded in a signed token and back:
//!
//! ```json
//! {
//!   "identity": "user-id",
//!   "sub": "user-id",
//!   "user_claims": {
//!     "session_id": "6f1c...",
//!     "roles": { "root>parent": ["editor"] }
//!   }
//! }
//! ```
//!
//! `identity` must be present (it is `null` for anonymous sessions); `sub`
//! duplicates it for older consumers and must agree with it when present.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::MalformedTokenError;
use crate::session::Session;

/// Claims that represent a session inside a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TokenClaims {
    /// User identifier, `null` for anonymous sessions. The key is required.
    #[serde(deserialize_with = "Option::deserialize")]
    pub identity: Option<String>,
    /// Same value as `identity`
    #[serde(default)]
    pub sub: Option<String>,
    pub user_claims: UserClaims,
}

/// Session specific part of the claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserClaims {
    pub session_id: String,
    /// Roles per organization path. List order carries no meaning.
    pub roles: BTreeMap<String, Vec<String>>,
}

impl TokenClaims {
    /// Validates raw claims, e.g. a decoded token payload.
    ///
    /// Unknown keys such as `exp` and `iat` are ignored.
    pub fn from_value(value: serde_json::Value) -> Result<Self, MalformedTokenError> {
        Ok(serde_json::from_value(value)?)
    }
}

impl Session {
    /// Serializes the session into token claims. Inverse of [`Session::from_claims`].
    pub fn to_claims(&self) -> TokenClaims {
        let identity = self.identity().map(str::to_string);
        let roles = self
            .roles()
            .iter()
            .map(|(org, roles)| (org.clone(), roles.iter().cloned().collect()))
            .collect();

        TokenClaims {
            sub: identity.clone(),
            identity,
            user_claims: UserClaims {
                session_id: self.session_id().to_string(),
                roles,
            },
        }
    }

    /// Rebuilds a session from token claims, keeping its session id.
    pub fn from_claims(claims: TokenClaims) -> Result<Self, MalformedTokenError> {
        let TokenClaims {
            identity,
            sub,
            user_claims,
        } = claims;

        if sub.is_some() && sub != identity {
            return Err(MalformedTokenError::IdentityMismatch { identity, sub });
        }

        Ok(Session::new(
            identity,
            user_claims.roles,
            Some(user_claims.session_id),
        ))
    }
}

/// Serializes `session` into token claims.
pub fn to_claims(session: &Session) -> TokenClaims {
    session.to_claims()
}

/// Rebuilds a session from raw token claims.
pub fn from_claims(claims: serde_json::Value) -> Result<Session, MalformedTokenError> {
    Session::from_claims(TokenClaims::from_value(claims)?)
}
