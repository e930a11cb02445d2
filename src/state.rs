use std::fmt;
use std::sync::Arc;

use istack_config::JwtConfig;

use crate::middleware::auth::{JwtVerifier, TokenVerifier};
use crate::middleware::hooks::{NoopSessionHook, SessionHook};

/// Shared state handed to guards and extractors.
///
/// The token verifier and the session hook are injected here rather than
/// registered globally, so tests and hosts can swap them per router.
#[derive(Clone)]
pub struct AppState {
    pub jwt_config: JwtConfig,
    pub verifier: Arc<dyn TokenVerifier>,
    pub session_hook: Arc<dyn SessionHook>,
}

impl AppState {
    /// State verifying tokens with `jwt_config` and without a session hook.
    pub fn new(jwt_config: JwtConfig) -> Self {
        Self {
            verifier: Arc::new(JwtVerifier::new(jwt_config.clone())),
            session_hook: Arc::new(NoopSessionHook),
            jwt_config,
        }
    }

    pub fn with_verifier(mut self, verifier: impl TokenVerifier + 'static) -> Self {
        self.verifier = Arc::new(verifier);
        self
    }

    pub fn with_session_hook(mut self, hook: impl SessionHook + 'static) -> Self {
        self.session_hook = Arc::new(hook);
        self
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("jwt_config", &self.jwt_config)
            .finish_non_exhaustive()
    }
}

pub fn init_app_state() -> AppState {
    AppState::new(JwtConfig::from_env())
}
