//! Tracing helpers for authentication events.
//!
//! The request span opened by [`crate::logging::logging_middleware`] declares
//! empty `user`, `session_id` and `auth.success` fields; the route guard fills
//! them in so every log line of the request carries the session user.

use tracing::Span;

use istack_auth::Session;

/// Placeholder recorded for sessions without identity.
pub const ANONYMOUS_USER: &str = "<anonymous>";

/// Record the session user and id on the current span
pub fn record_session(session: &Session) {
    let span = Span::current();
    span.record("user", session.identity().unwrap_or(ANONYMOUS_USER));
    span.record("session_id", session.session_id());
}

/// Record authentication success/failure on the current span
pub fn record_auth_result(success: bool) {
    Span::current().record("auth.success", success);
}

/// Log a security-relevant event at WARN level
///
/// Use this for events like failed authentication and authorization denials.
#[macro_export]
macro_rules! security_event {
    ($event:expr, $($field:tt)*) => {
        tracing::warn!(
            security.event = $event,
            $($field)*
        )
    };
}
