#![allow(dead_code)]

use axum::{Router, body::Body, http::Request, response::Response};
use http_body_util::BodyExt;
use tower::ServiceExt;

use istack::istack_auth::Session;
use istack::router::init_router;
use istack::state::AppState;
use istack::testing::{bearer_header, issue_token, test_state};

pub const ORG: &str = "acme";
pub const USER_ID: &str = "9b2d1c1e-0000-4000-8000-000000000001";

/// A logged in session holding `roles` in [`ORG`].
pub fn user_session(roles: &[&str]) -> Session {
    Session::new(
        Some(USER_ID.to_string()),
        [(ORG, roles.iter().copied().collect::<Vec<_>>())],
        None,
    )
}

pub fn setup_test_app() -> (Router, AppState) {
    let state = test_state();
    (init_router(state.clone()), state)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn get_with_token(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("authorization", bearer_header(token))
        .body(Body::empty())
        .unwrap()
}

pub fn get_as(uri: &str, session: &Session, state: &AppState) -> Request<Body> {
    get_with_token(uri, &issue_token(session, &state.jwt_config))
}

pub async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}
