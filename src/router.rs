use axum::{Json, Router, middleware, routing::get};
use utoipa::OpenApi;

use crate::docs::ApiDoc;
use crate::logging::logging_middleware;
use crate::modules::session::init_session_router;
use crate::state::AppState;

pub fn init_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .nest(
            "/api",
            Router::new().nest("/session", init_session_router(state.clone())),
        )
        .with_state(state)
        .layer(middleware::from_fn(logging_middleware))
}
