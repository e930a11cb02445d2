use axum::{Router, middleware, routing::get};

use crate::middleware::guard::{GuardedRoute, RouteGuard, enforce};
use crate::state::AppState;

use super::controller::{get_organizations, get_session};

pub fn init_session_router(state: AppState) -> Router<AppState> {
    let optional_routes = Router::new()
        .route("/organizations", get(get_organizations))
        .route_layer(middleware::from_fn_with_state(
            GuardedRoute::new(state, RouteGuard::authenticated().optional()),
            enforce,
        ));

    Router::new()
        .route("/", get(get_session))
        .merge(optional_routes)
}
