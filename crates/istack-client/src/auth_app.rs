//! Client for the auth-app that issues service tokens, and the request
//! authentication that attaches those tokens to outbound calls.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use reqwest::RequestBuilder;
use serde::Deserialize;
use url::Url;

use crate::config::AuthAppConfig;
use crate::error::ClientError;
use crate::rest::{RequestAuth, RestClient, Target, decode};

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: String,
}

/// Anything that can hand out a bearer token for the next request.
pub trait TokenSource: Send + Sync {
    fn token(&self) -> impl Future<Output = Result<String, ClientError>> + Send;
}

/// Talks to the auth-app at `<api_url>/auth/v1`.
#[derive(Clone)]
pub struct AuthAppClient {
    rest: RestClient,
    api_key: String,
}

impl fmt::Debug for AuthAppClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthAppClient")
            .field("base_url", &self.rest.base_url().as_str())
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl AuthAppClient {
    /// `base_url` is the auth API root, e.g. `https://impact-stack.net/api/auth/v1`.
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self, ClientError> {
        Ok(Self {
            rest: RestClient::new(base_url)?,
            api_key: api_key.into(),
        })
    }

    pub fn from_config(config: &AuthAppConfig) -> Result<Self, ClientError> {
        Ok(Self {
            rest: RestClient::with_timeout(
                &config.auth_url(),
                Duration::from_secs(config.timeout_secs),
            )?,
            api_key: config.api_key.clone(),
        })
    }

    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_config(&AuthAppConfig::from_env()?)
    }

    pub fn base_url(&self) -> &Url {
        self.rest.base_url()
    }

    /// Exchanges the API key for a fresh JWT.
    ///
    /// The key is posted to `token` as a bare JSON string and the response
    /// must look like `{"token": "..."}`.
    pub async fn get_token(&self) -> Result<String, ClientError> {
        let response = self.rest.post(Target::Parts(&["token"]), &self.api_key).await?;
        let body: TokenResponse = decode(response).await?;
        tracing::debug!(base_url = %self.rest.base_url(), "Fetched auth-app token");
        Ok(body.token)
    }
}

impl TokenSource for AuthAppClient {
    async fn token(&self) -> Result<String, ClientError> {
        self.get_token().await
    }
}

/// Authenticates each request with a bearer token from `T`.
///
/// A new token is fetched for every request.
#[derive(Debug, Clone)]
pub struct AuthAppMiddleware<T = AuthAppClient> {
    source: T,
}

impl AuthAppMiddleware {
    pub fn from_env() -> Result<Self, ClientError> {
        Ok(Self::new(AuthAppClient::from_env()?))
    }
}

impl<T: TokenSource> AuthAppMiddleware<T> {
    pub fn new(source: T) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &T {
        &self.source
    }
}

impl<T: TokenSource> RequestAuth for AuthAppMiddleware<T> {
    async fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder, ClientError> {
        let token = self.source.token().await?;
        Ok(request.bearer_auth(token))
    }
}
