//! Outbound client error types.

use crate::config::ConfigError;

/// Errors from requests sent by [`crate::RestClient`].
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The target lies outside the client's base URL. Nothing was sent.
    #[error("This client only sends requests to {base_url}")]
    UrlRequired { base_url: String },

    #[error("invalid URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },

    /// HTTP transport error, including timeouts.
    #[error("HTTP error calling {url}: {source}")]
    Http {
        url: String,
        source: reqwest::Error,
    },

    /// The server answered with a non-2xx status.
    #[error("{url} returned {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[error("failed to deserialize response from {url}: {source}")]
    Deserialization {
        url: String,
        source: reqwest::Error,
    },

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}
