//! Middleware and extractors for sessions and authorization.
//!
//! # Modules
//!
//! - [`auth`]: Token verification, bearer/org header parsing, session extractors
//! - [`guard`]: The route guard and its axum middleware
//! - [`hooks`]: Callbacks run once a session is established
//!
//! # Authentication Flow
//!
//! 1. Client sends request with `Authorization: Bearer <token>` header
//!    (or, on optional routes, only an `x-ist-org` header)
//! 2. The route guard verifies the token and decodes the session
//! 3. The session hook runs
//! 4. The guard checks the admitted roles
//! 5. Handler executes with the session in the request extensions
//!
//! # Example
//!
//! ```ignore
//! use istack::middleware::auth::{AuthSession, CurrentSession};
//!
//! // Basic authentication (any valid token)
//! async fn get_profile(AuthSession(session): AuthSession) -> impl IntoResponse {
//!     // ...
//! }
//!
//! // Behind `enforce`, read the session the guard established
//! async fn dashboard(CurrentSession(session): CurrentSession) -> impl IntoResponse {
//!     // ...
//! }
//! ```

pub mod auth;
pub mod guard;
pub mod hooks;
