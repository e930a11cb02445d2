//! Route guard: authentication and role checks in front of a handler.
//!
//! Every guarded request goes through the same steps:
//!
//! ```text
//! UNVERIFIED ──token ok──────────────────► VERIFIED(session) ─┐
//!     │                                                        ├─ roles ok ─► AUTHORIZED
//!     ├─no token + optional / exempt method► ANONYMOUS(session)┘     │
//!     │                                                              └─ no ──► REJECTED (403)
//!     └─otherwise────────────────────────────────────────────────────────────► REJECTED (401)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use axum::{Router, middleware, routing::get};
//! use istack::middleware::guard::{GuardedRoute, RouteGuard, enforce};
//!
//! let app_routes = Router::new()
//!     .route("/dashboard", get(dashboard))
//!     .route_layer(middleware::from_fn_with_state(
//!         GuardedRoute::new(state.clone(), RouteGuard::admitted(["app"])),
//!         enforce,
//!     ));
//! ```

use std::collections::BTreeSet;

use axum::{
    extract::{Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use istack_auth::{AuthenticationFailure, AuthorizationFailure, Session, create_anonymous_session};
use istack_core::AppError;

use crate::middleware::auth::{bearer_token, org_hint};
use crate::security_event;
use crate::state::AppState;
use crate::utils::tracing::{record_auth_result, record_session};

/// Outcome of the authentication step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    /// A valid token was presented.
    Verified(Session),
    /// No token, but anonymous access is allowed for this request.
    Anonymous(Session),
}

impl Verification {
    pub fn session(&self) -> &Session {
        match self {
            Verification::Verified(session) | Verification::Anonymous(session) => session,
        }
    }

    pub fn into_session(self) -> Session {
        match self {
            Verification::Verified(session) | Verification::Anonymous(session) => session,
        }
    }
}

/// Why a guarded request was turned away.
///
/// Clients can tell "not logged in" (401) from "logged in but not
/// permitted" (403).
#[derive(Debug, Error)]
pub enum Rejection {
    #[error(transparent)]
    Authentication(#[from] AuthenticationFailure),

    #[error(transparent)]
    Authorization(#[from] AuthorizationFailure),
}

impl Rejection {
    pub fn into_app_error(self) -> AppError {
        match self {
            Rejection::Authentication(failure) => AppError::unauthorized(failure.to_string()),
            Rejection::Authorization(failure) => AppError::forbidden(failure.to_string()),
        }
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        self.into_app_error().into_response()
    }
}

/// Access requirements of a route.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteGuard {
    admitted_roles: Option<BTreeSet<String>>,
    optional: bool,
}

impl RouteGuard {
    /// `admitted_roles` of `None` skips authorization. An empty set admits
    /// any session with at least one organization entry.
    pub fn new(admitted_roles: Option<BTreeSet<String>>, optional: bool) -> Self {
        Self {
            admitted_roles,
            optional,
        }
    }

    /// Requires a valid token, no role check.
    pub fn authenticated() -> Self {
        Self::new(None, false)
    }

    /// Requires a valid token whose session holds any of `roles`.
    pub fn admitted<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Some(roles.into_iter().map(Into::into).collect()), false)
    }

    /// Allows requests without a token to proceed with an anonymous session.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn admitted_roles(&self) -> Option<&BTreeSet<String>> {
        self.admitted_roles.as_ref()
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Authentication step.
    ///
    /// Exempt methods (see `JwtConfig::exempt_methods`) always proceed
    /// anonymously. Without a usable `Authorization` header the request
    /// proceeds anonymously only for optional routes. A token that is present
    /// but invalid is rejected even on optional routes.
    pub fn verify(&self, parts: &Parts, state: &AppState) -> Result<Verification, Rejection> {
        if state.jwt_config.is_exempt(parts.method.as_str()) {
            return Ok(Verification::Anonymous(create_anonymous_session(org_hint(
                &parts.headers,
            ))));
        }

        let token = match bearer_token(&parts.headers) {
            Ok(Some(token)) => token,
            Ok(None) | Err(AuthenticationFailure::InvalidHeader) if self.optional => {
                return Ok(Verification::Anonymous(create_anonymous_session(org_hint(
                    &parts.headers,
                ))));
            }
            Ok(None) => return Err(AuthenticationFailure::MissingToken.into()),
            Err(failure) => return Err(failure.into()),
        };

        let claims = state.verifier.verify(&token)?;
        let session = Session::from_claims(claims).map_err(AuthenticationFailure::from)?;
        Ok(Verification::Verified(session))
    }

    /// Authorization step.
    pub fn authorize(&self, verification: Verification) -> Result<Session, Rejection> {
        let session = verification.into_session();

        if let Some(admitted) = &self.admitted_roles {
            let roles: Vec<&str> = admitted.iter().map(String::as_str).collect();
            if !session.has_any_role_of(&roles, None) {
                return Err(AuthorizationFailure {
                    admitted_roles: admitted.clone(),
                }
                .into());
            }
        }

        Ok(session)
    }

    /// Runs both steps without side effects on the request.
    pub fn evaluate(&self, parts: &Parts, state: &AppState) -> Result<Session, Rejection> {
        self.authorize(self.verify(parts, state)?)
    }

    /// Runs the guard for a request.
    ///
    /// The session hook sees the session between authentication and
    /// authorization. On success the session is stored in the request
    /// extensions, where [`crate::middleware::auth::CurrentSession`] finds it.
    pub fn run(&self, parts: &mut Parts, state: &AppState) -> Result<Session, AppError> {
        let verification = self.verify(parts, state).map_err(|rejection| {
            record_auth_result(false);
            security_event!(
                "authentication_failed",
                method = %parts.method,
                path = %parts.uri.path(),
                reason = %rejection
            );
            rejection.into_app_error()
        })?;

        record_session(verification.session());
        state
            .session_hook
            .push_context(verification.session(), &mut parts.extensions)?;

        let session = self.authorize(verification).map_err(|rejection| {
            record_auth_result(false);
            security_event!(
                "authorization_denied",
                method = %parts.method,
                path = %parts.uri.path(),
                reason = %rejection
            );
            rejection.into_app_error()
        })?;

        record_auth_result(true);
        parts.extensions.insert(session.clone());
        Ok(session)
    }
}

/// State for [`enforce`]: the application state plus the route's guard.
#[derive(Clone, Debug)]
pub struct GuardedRoute {
    pub state: AppState,
    pub guard: RouteGuard,
}

impl GuardedRoute {
    pub fn new(state: AppState, guard: RouteGuard) -> Self {
        Self { state, guard }
    }
}

/// Middleware that runs a [`RouteGuard`] before the handler.
///
/// Use with `axum::middleware::from_fn_with_state` and a [`GuardedRoute`].
pub async fn enforce(State(route): State<GuardedRoute>, req: Request, next: Next) -> Response {
    let (mut parts, body) = req.into_parts();

    match route.guard.run(&mut parts, &route.state) {
        Ok(_) => next.run(Request::from_parts(parts, body)).await,
        Err(err) => err.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Method, Request as HttpRequest, StatusCode};

    use crate::testing::{issue_token, test_state};

    fn parts(method: Method, headers: &[(&str, String)]) -> Parts {
        let mut builder = HttpRequest::builder().method(method).uri("/protected");
        for (name, value) in headers {
            builder = builder.header(*name, value.as_str());
        }
        builder.body(()).unwrap().into_parts().0
    }

    fn app_session() -> Session {
        Session::new(Some("user-id".to_string()), [("acme", ["app"])], None)
    }

    #[test]
    fn test_verified_and_authorized() {
        let state = test_state();
        let token = issue_token(&app_session(), &state.jwt_config);
        let parts = parts(
            Method::GET,
            &[("authorization", format!("Bearer {}", token))],
        );

        let session = RouteGuard::admitted(["app"]).evaluate(&parts, &state).unwrap();
        assert_eq!(session.identity(), Some("user-id"));
    }

    #[test]
    fn test_missing_token_is_authentication_failure() {
        let state = test_state();
        let parts = parts(Method::GET, &[]);

        let result = RouteGuard::admitted(["app"]).evaluate(&parts, &state);
        assert!(matches!(
            result,
            Err(Rejection::Authentication(AuthenticationFailure::MissingToken))
        ));
    }

    #[test]
    fn test_missing_role_is_authorization_failure() {
        let state = test_state();
        let token = issue_token(&app_session(), &state.jwt_config);
        let parts = parts(
            Method::GET,
            &[("authorization", format!("Bearer {}", token))],
        );

        let result = RouteGuard::admitted(["admin"]).evaluate(&parts, &state);
        assert!(matches!(result, Err(Rejection::Authorization(_))));
    }

    #[test]
    fn test_optional_without_token_is_anonymous() {
        let state = test_state();
        let parts = parts(Method::GET, &[("x-ist-org", "acme".to_string())]);

        let verification = RouteGuard::authenticated()
            .optional()
            .verify(&parts, &state)
            .unwrap();
        let Verification::Anonymous(session) = verification else {
            panic!("expected anonymous session");
        };
        assert!(session.is_anonymous());
        assert!(session.roles()["acme"].is_empty());
    }

    #[test]
    fn test_optional_with_invalid_token_is_rejected() {
        let state = test_state();
        let parts = parts(
            Method::GET,
            &[("authorization", "Bearer garbage".to_string())],
        );

        let result = RouteGuard::authenticated().optional().verify(&parts, &state);
        assert!(matches!(
            result,
            Err(Rejection::Authentication(AuthenticationFailure::InvalidToken))
        ));
    }

    #[test]
    fn test_optional_with_non_bearer_header_is_anonymous() {
        let state = test_state();
        let parts = parts(
            Method::GET,
            &[("authorization", "Basic dXNlcjpwYXNz".to_string())],
        );

        let verification = RouteGuard::authenticated()
            .optional()
            .verify(&parts, &state)
            .unwrap();
        assert!(matches!(verification, Verification::Anonymous(_)));
    }

    #[test]
    fn test_exempt_method_is_anonymous() {
        let state = test_state();
        let parts = parts(Method::OPTIONS, &[("x-ist-org", "acme".to_string())]);

        let session = RouteGuard::new(Some(BTreeSet::new()), false)
            .evaluate(&parts, &state)
            .unwrap();
        assert!(session.is_anonymous());
    }

    #[test]
    fn test_anonymous_still_checked_against_roles() {
        let state = test_state();
        let parts = parts(Method::GET, &[("x-ist-org", "acme".to_string())]);

        let result = RouteGuard::admitted(["app"]).optional().evaluate(&parts, &state);
        assert!(matches!(result, Err(Rejection::Authorization(_))));
    }

    #[test]
    fn test_empty_admitted_roles_admits_org_members() {
        let state = test_state();
        let guard = RouteGuard::new(Some(BTreeSet::new()), true);

        let with_org = parts(Method::GET, &[("x-ist-org", "acme".to_string())]);
        assert!(guard.evaluate(&with_org, &state).is_ok());

        let without_org = parts(Method::GET, &[]);
        assert!(matches!(
            guard.evaluate(&without_org, &state),
            Err(Rejection::Authorization(_))
        ));
    }

    #[test]
    fn test_run_stores_session_in_extensions() {
        let state = test_state();
        let session = app_session();
        let token = issue_token(&session, &state.jwt_config);
        let mut parts = parts(
            Method::GET,
            &[("authorization", format!("Bearer {}", token))],
        );

        RouteGuard::authenticated().run(&mut parts, &state).unwrap();
        assert_eq!(parts.extensions.get::<Session>(), Some(&session));
    }

    #[test]
    fn test_rejection_status_codes() {
        let authn = Rejection::from(AuthenticationFailure::MissingToken).into_app_error();
        assert_eq!(authn.status, StatusCode::UNAUTHORIZED);

        let authz = Rejection::from(AuthorizationFailure {
            admitted_roles: BTreeSet::from(["app".to_string()]),
        })
        .into_app_error();
        assert_eq!(authz.status, StatusCode::FORBIDDEN);
    }
}
