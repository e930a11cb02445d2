//! Auth-app client configuration.

use std::env;
use std::fmt;

use url::Url;

/// Request timeout applied when none is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 2;

/// Version segment of the auth-app API.
pub const AUTH_API_VERSION: &str = "v1";

/// Where the auth-app lives and how to authenticate against it.
///
/// Custom `Debug` implementation redacts the `api_key` field.
#[derive(Clone)]
pub struct AuthAppConfig {
    /// Base URL of the Impact Stack API, e.g. `https://impact-stack.net/api`
    pub api_url: Url,
    /// API key exchanged for tokens
    pub api_key: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl fmt::Debug for AuthAppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthAppConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &"[REDACTED]")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl AuthAppConfig {
    pub fn new(api_url: Url, api_key: impl Into<String>) -> Self {
        Self {
            api_url,
            api_key: api_key.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `IMPACT_STACK_API_URL` (required)
    /// - `IMPACT_STACK_API_KEY` (required)
    /// - `IMPACT_STACK_API_TIMEOUT` seconds (default: 2)
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw_url = required("IMPACT_STACK_API_URL")?;
        let api_url = Url::parse(&raw_url).map_err(|source| ConfigError::InvalidUrl {
            var: "IMPACT_STACK_API_URL",
            source,
        })?;

        Ok(Self {
            api_url,
            api_key: required("IMPACT_STACK_API_KEY")?,
            timeout_secs: env::var("IMPACT_STACK_API_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Base URL of the auth API: `<api_url>/auth/v1`.
    pub fn auth_url(&self) -> String {
        format!(
            "{}/auth/{}",
            self.api_url.as_str().trim_end_matches('/'),
            AUTH_API_VERSION
        )
    }
}

fn required(var: &'static str) -> Result<String, ConfigError> {
    env::var(var)
        .ok()
        .filter(|value| !value.is_empty())
        .ok_or(ConfigError::Missing(var))
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} is not a valid URL: {source}")]
    InvalidUrl {
        var: &'static str,
        source: url::ParseError,
    },
}
