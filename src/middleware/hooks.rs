//! Hooks run once a request's session is established.
//!
//! A hook typically loads the user or organization the session refers to
//! and stores it in the request extensions for later extractors. Returning an
//! error aborts the request before authorization and before the handler runs.

use axum::http::Extensions;

use istack_auth::Session;
use istack_core::AppError;

pub trait SessionHook: Send + Sync {
    fn push_context(&self, session: &Session, extensions: &mut Extensions) -> Result<(), AppError>;
}

/// Default hook, does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSessionHook;

impl SessionHook for NoopSessionHook {
    fn push_context(&self, _session: &Session, _extensions: &mut Extensions) -> Result<(), AppError> {
        Ok(())
    }
}

impl<F> SessionHook for F
where
    F: Fn(&Session, &mut Extensions) -> Result<(), AppError> + Send + Sync,
{
    fn push_context(&self, session: &Session, extensions: &mut Extensions) -> Result<(), AppError> {
        self(session, extensions)
    }
}
