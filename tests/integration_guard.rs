mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::{
    Extension, Json, Router,
    body::Body,
    http::{Extensions, Request, StatusCode},
    middleware,
    routing::get,
};

use istack::istack_auth::{Session, TokenClaims};
use istack::istack_core::AppError;
use istack::middleware::auth::{AuthSession, CurrentSession};
use istack::middleware::guard::{GuardedRoute, RouteGuard, enforce};
use istack::require_roles;
use istack::state::AppState;
use istack::testing::{inject_session, test_state};

use common::{ORG, USER_ID, body_json, get as get_req, get_as, get_with_token, send, user_session};

/// Router with a single `/protected` route behind `guard`. The handler
/// echoes the session claims and counts its invocations.
fn guarded_app(state: AppState, guard: RouteGuard) -> (Router, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let app = Router::new()
        .route(
            "/protected",
            get(move |CurrentSession(session): CurrentSession| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Json(session.to_claims())
                }
            }),
        )
        .route_layer(middleware::from_fn_with_state(
            GuardedRoute::new(state.clone(), guard),
            enforce,
        ))
        .with_state(state);

    (app, calls)
}

fn claims(body: serde_json::Value) -> TokenClaims {
    serde_json::from_value(body).unwrap()
}

#[tokio::test]
async fn test_authorized_with_admitted_role() {
    let state = test_state();
    let session = user_session(&["app"]);
    let (app, calls) = guarded_app(state.clone(), RouteGuard::admitted(["app"]));

    let response = send(app, get_as("/protected", &session, &state)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = claims(body_json(response).await);
    assert_eq!(body.identity.as_deref(), Some(USER_ID));
    assert_eq!(body.user_claims.session_id, session.session_id());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

/// Guarded router whose handler additionally requires `app` at `org`.
fn org_scoped_app(state: AppState, org: &'static str) -> Router {
    Router::new()
        .route(
            "/report",
            get(move |CurrentSession(session): CurrentSession| async move {
                if session.has_any_role_of(&["app"], Some(org)) {
                    StatusCode::OK
                } else {
                    StatusCode::FORBIDDEN
                }
            }),
        )
        .route_layer(middleware::from_fn_with_state(
            GuardedRoute::new(state.clone(), RouteGuard::admitted(["app"])),
            enforce,
        ))
        .with_state(state)
}

#[tokio::test]
async fn test_role_at_parent_org_applies_to_child_org() {
    let state = test_state();
    let session = Session::new(Some(USER_ID.to_string()), [("acme", ["app"])], None);

    let response = send(
        org_scoped_app(state.clone(), "acme>branch"),
        get_as("/report", &session, &state),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_role_at_child_org_does_not_apply_to_parent_org() {
    let state = test_state();
    let session = Session::new(Some(USER_ID.to_string()), [("acme>branch", ["app"])], None);

    let response = send(
        org_scoped_app(state.clone(), "acme"),
        get_as("/report", &session, &state),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_missing_token_rejected_before_handler() {
    let state = test_state();
    let (app, calls) = guarded_app(state, RouteGuard::admitted(["app"]));

    let response = send(app, get_req("/protected")).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Missing authorization header");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_invalid_token_rejected() {
    let state = test_state();
    let (app, calls) = guarded_app(state, RouteGuard::authenticated());

    let response = send(app, get_with_token("/protected", "not.a.token")).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_non_bearer_header_rejected() {
    let state = test_state();
    let (app, _) = guarded_app(state, RouteGuard::authenticated());

    let request = Request::builder()
        .uri("/protected")
        .header("authorization", "Basic dXNlcjpwYXNz")
        .body(Body::empty())
        .unwrap();

    let response = send(app, request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_missing_role_is_forbidden_not_unauthorized() {
    let state = test_state();
    let session = user_session(&["viewer"]);
    let (app, calls) = guarded_app(state.clone(), RouteGuard::admitted(["app"]));

    let response = send(app, get_as("/protected", &session, &state)).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_unguarded_roles_admit_any_valid_token() {
    let state = test_state();
    let session = Session::new(
        Some(USER_ID.to_string()),
        Vec::<(String, Vec<String>)>::new(),
        None,
    );
    let (app, _) = guarded_app(state.clone(), RouteGuard::authenticated());

    let response = send(app, get_as("/protected", &session, &state)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_optional_anonymous_with_org_header() {
    let state = test_state();
    let (app, calls) = guarded_app(state, RouteGuard::authenticated().optional());

    let request = Request::builder()
        .uri("/protected")
        .header("X-IST-ORG", ORG)
        .body(Body::empty())
        .unwrap();

    let response = send(app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = claims(body_json(response).await);
    assert_eq!(body.identity, None);
    assert_eq!(body.user_claims.roles.len(), 1);
    assert!(body.user_claims.roles[ORG].is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_optional_with_valid_token_is_verified() {
    let state = test_state();
    let session = user_session(&["app"]);
    let (app, _) = guarded_app(state.clone(), RouteGuard::authenticated().optional());

    let response = send(app, get_as("/protected", &session, &state)).await;

    let body = claims(body_json(response).await);
    assert_eq!(body.identity.as_deref(), Some(USER_ID));
}

#[tokio::test]
async fn test_optional_with_invalid_token_still_unauthorized() {
    let state = test_state();
    let (app, _) = guarded_app(state, RouteGuard::authenticated().optional());

    let response = send(app, get_with_token("/protected", "garbage")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_anonymous_lacks_admitted_role() {
    let state = test_state();
    let (app, calls) = guarded_app(state, RouteGuard::admitted(["app"]).optional());

    let request = Request::builder()
        .uri("/protected")
        .header("x-ist-org", ORG)
        .body(Body::empty())
        .unwrap();

    let response = send(app, request).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_options_request_is_exempt() {
    let state = test_state();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let app = Router::new()
        .route(
            "/protected",
            axum::routing::options(move |CurrentSession(session): CurrentSession| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    assert!(session.is_anonymous());
                    StatusCode::NO_CONTENT
                }
            }),
        )
        .route_layer(middleware::from_fn_with_state(
            GuardedRoute::new(state.clone(), RouteGuard::authenticated()),
            enforce,
        ))
        .with_state(state);

    let request = Request::builder()
        .method("OPTIONS")
        .uri("/protected")
        .body(Body::empty())
        .unwrap();

    let response = send(app, request).await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[derive(Debug, Clone)]
struct LoadedUser(String);

#[tokio::test]
async fn test_session_hook_context_reaches_handler() {
    let state = test_state().with_session_hook(
        |session: &Session, extensions: &mut Extensions| -> Result<(), AppError> {
            let user = session.identity().unwrap_or("anonymous").to_string();
            extensions.insert(LoadedUser(user));
            Ok(())
        },
    );
    let session = user_session(&["app"]);

    let app = Router::new()
        .route(
            "/me",
            get(|Extension(user): Extension<LoadedUser>| async move { user.0 }),
        )
        .route_layer(middleware::from_fn_with_state(
            GuardedRoute::new(state.clone(), RouteGuard::admitted(["app"])),
            enforce,
        ))
        .with_state(state.clone());

    let response = send(app, get_as("/me", &session, &state)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = http_body_util::BodyExt::collect(response.into_body())
        .await
        .unwrap()
        .to_bytes();
    assert_eq!(&body[..], USER_ID.as_bytes());
}

#[tokio::test]
async fn test_session_hook_can_reject() {
    let state = test_state().with_session_hook(
        |_session: &Session, _extensions: &mut Extensions| -> Result<(), AppError> {
            Err(AppError::not_found(anyhow::anyhow!("User no longer exists")))
        },
    );
    let session = user_session(&["app"]);
    let (app, calls) = guarded_app(state.clone(), RouteGuard::admitted(["app"]));

    let response = send(app, get_as("/protected", &session, &state)).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_injected_session_accepts_any_token() {
    let session = user_session(&["app"]);
    let state = inject_session(test_state(), &session);
    let (app, _) = guarded_app(state, RouteGuard::admitted(["app"]));

    let response = send(app, get_with_token("/protected", "anything")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = claims(body_json(response).await);
    assert_eq!(body.user_claims.session_id, session.session_id());
}

require_roles!(RequireApp, ["app"]);

async fn app_only(RequireApp(session): RequireApp) -> String {
    session.identity().unwrap_or_default().to_string()
}

#[tokio::test]
async fn test_require_roles_extractor() {
    let state = test_state();
    let app = Router::new()
        .route("/app-only", get(app_only))
        .with_state(state.clone());

    let allowed = send(
        app.clone(),
        get_as("/app-only", &user_session(&["app"]), &state),
    )
    .await;
    assert_eq!(allowed.status(), StatusCode::OK);

    let denied = send(
        app.clone(),
        get_as("/app-only", &user_session(&["viewer"]), &state),
    )
    .await;
    assert_eq!(denied.status(), StatusCode::FORBIDDEN);

    let anonymous = send(app, get_req("/app-only")).await;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_session_rejects_exempt_method() {
    let state = test_state();
    let app = Router::new()
        .route(
            "/profile",
            axum::routing::options(|AuthSession(session): AuthSession| async move {
                session.identity().unwrap_or_default().to_string()
            }),
        )
        .with_state(state);

    let request = Request::builder()
        .method("OPTIONS")
        .uri("/profile")
        .header("x-ist-org", ORG)
        .body(Body::empty())
        .unwrap();

    let response = send(app, request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
