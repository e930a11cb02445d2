//! # istack
//!
//! Organization scoped sessions and role based authorization for axum
//! services.
//!
//! ## Overview
//!
//! Organizations form a tree addressed by paths such as `root>parent>child`.
//! A session grants roles per organization; a role granted for an
//! organization also applies to all of its descendants. Requests carry the
//! session as a signed bearer token.
//!
//! ```text
//! crates/
//! ├── istack-core/      # AppError
//! ├── istack-config/    # JwtConfig, LogConfig
//! ├── istack-auth/      # Org paths, Session, claims, JWT
//! └── istack-client/    # Outbound REST client, auth-app tokens
//! src/
//! ├── middleware/       # Route guard, extractors, session hooks
//! ├── modules/          # Feature modules (session)
//! └── utils/            # Span recording helpers
//! ```
//!
//! ## Guarding routes
//!
//! ```ignore
//! use axum::{Router, middleware, routing::get};
//! use istack::middleware::guard::{GuardedRoute, RouteGuard, enforce};
//!
//! let router = Router::new()
//!     .route("/reports", get(reports))
//!     .route_layer(middleware::from_fn_with_state(
//!         GuardedRoute::new(state.clone(), RouteGuard::admitted(["reporter"])),
//!         enforce,
//!     ));
//! ```
//!
//! Requests without a valid token are answered with 401, sessions lacking
//! all admitted roles with 403.
//!
//! ## Environment Variables
//!
//! ```bash
//! JWT_SECRET=your-secure-secret-key
//! JWT_ACCESS_EXPIRY=3600
//! JWT_LEEWAY=0
//! JWT_EXEMPT_METHODS=OPTIONS
//! LOG_LEVEL=info
//! LOG_FILE=logs/istack.log
//! LOG_FILE_ROTATION=daily
//! APP_ADDR=0.0.0.0:3000
//! IMPACT_STACK_API_URL=https://impact-stack.net/api
//! IMPACT_STACK_API_KEY=your-api-key
//! ```
//!
//! ## Modules
//!
//! - [`docs`]: OpenAPI document
//! - [`logging`]: Subscriber setup and request logging
//! - [`middleware`]: Route guard, extractors and session hooks
//! - [`modules`]: Feature modules
//! - [`router`]: Main application router
//! - [`state`]: Shared application state
//! - [`utils`]: Shared utilities

pub mod docs;
pub mod logging;
pub mod middleware;
pub mod modules;
pub mod router;
pub mod state;
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;
pub mod utils;

// Re-export workspace crates for convenience
pub use istack_auth;
pub use istack_client;
pub use istack_config;
pub use istack_core;
