use std::fmt;

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};

use istack_auth::{AuthenticationFailure, Session, TokenClaims, verify_token};
use istack_config::JwtConfig;
use istack_core::AppError;

use crate::middleware::guard::RouteGuard;
use crate::state::AppState;

/// Header carrying the organization hint of an anonymous request.
pub const ORG_HEADER: &str = "x-ist-org";

/// Verifies a bearer token and returns its decoded claims.
///
/// The default implementation is [`JwtVerifier`]. Tests swap in a verifier
/// that accepts any token.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<TokenClaims, AuthenticationFailure>;
}

/// Verifies HS256 tokens signed with the configured secret.
#[derive(Clone)]
pub struct JwtVerifier {
    config: JwtConfig,
}

impl JwtVerifier {
    pub fn new(config: JwtConfig) -> Self {
        Self { config }
    }
}

impl fmt::Debug for JwtVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtVerifier").finish_non_exhaustive()
    }
}

impl TokenVerifier for JwtVerifier {
    fn verify(&self, token: &str) -> Result<TokenClaims, AuthenticationFailure> {
        verify_token(token, &self.config)
    }
}

/// Extracts the bearer token from the `Authorization` header.
///
/// Returns `Ok(None)` when the header is absent and
/// [`AuthenticationFailure::InvalidHeader`] when it is not a bearer token.
pub fn bearer_token(headers: &HeaderMap) -> Result<Option<String>, AuthenticationFailure> {
    if !headers.contains_key(header::AUTHORIZATION) {
        return Ok(None);
    }

    headers
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| Some(auth.token().to_string()))
        .ok_or(AuthenticationFailure::InvalidHeader)
}

/// Organization hint sent by the client, if any.
pub fn org_hint(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(ORG_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// The session established by a route guard for this request.
///
/// Only available on routes behind [`crate::middleware::guard::enforce`] or
/// after one of the guarding extractors ran.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Session);

impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .map(CurrentSession)
            .ok_or_else(|| {
                AppError::internal_error("No session established for this route".to_string())
            })
    }
}

/// Extractor that requires a valid token, without checking roles.
///
/// The session always has an identity. Anonymous sessions, including those
/// the guard creates for exempt methods such as `OPTIONS`, are rejected
/// with 401.
#[derive(Debug, Clone)]
pub struct AuthSession(pub Session);

impl AuthSession {
    pub fn identity(&self) -> Option<&str> {
        self.0.identity()
    }
}

impl FromRequestParts<AppState> for AuthSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(session) = parts.extensions.get::<Session>() {
            if !session.is_anonymous() {
                return Ok(AuthSession(session.clone()));
            }
        }

        let session = RouteGuard::authenticated().run(parts, state)?;
        if session.is_anonymous() {
            return Err(AppError::unauthorized(
                AuthenticationFailure::MissingToken.to_string(),
            ));
        }
        Ok(AuthSession(session))
    }
}

/// Creates an extractor that only admits sessions holding one of the given
/// roles in any of their organizations.
///
/// ```ignore
/// require_roles!(RequireApp, ["app"]);
///
/// async fn handler(RequireApp(session): RequireApp) -> impl IntoResponse {
///     // Only executes if the session has the "app" role somewhere
/// }
/// ```
#[macro_export]
macro_rules! require_roles {
    ($name:ident, [$($role:literal),+ $(,)?]) => {
        #[derive(Debug, Clone)]
        pub struct $name(pub $crate::istack_auth::Session);

        impl axum::extract::FromRequestParts<$crate::state::AppState> for $name {
            type Rejection = $crate::istack_core::AppError;

            async fn from_request_parts(
                parts: &mut axum::http::request::Parts,
                state: &$crate::state::AppState,
            ) -> Result<Self, Self::Rejection> {
                $crate::middleware::guard::RouteGuard::admitted([$($role),+])
                    .run(parts, state)
                    .map($name)
            }
        }
    };
}
