//! Outbound HTTP client for Impact Stack services.
//!
//! - [`RestClient`]: JSON client restricted to one base URL
//! - [`AuthAppClient`]: fetches service tokens from the auth-app
//! - [`AuthAppMiddleware`]: attaches `Bearer <token>` to each request
//!
//! ```ignore
//! let auth = AuthAppMiddleware::from_env()?;
//! let client = RestClient::new("https://impact-stack.net/api/campaigns/v1")?.with_auth(auth);
//! let campaigns: serde_json::Value = client.get_json(Target::Parts(&["campaigns"])).await?;
//! ```

pub mod auth_app;
pub mod config;
pub mod error;
pub mod rest;

pub use auth_app::{AuthAppClient, AuthAppMiddleware, TokenSource};
pub use config::{AuthAppConfig, ConfigError};
pub use error::ClientError;
pub use rest::{NoAuth, RequestAuth, RestClient, Target};
