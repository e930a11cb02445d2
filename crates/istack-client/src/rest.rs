//! REST/JSON client bound to a single base URL.
//!
//! Every request target is resolved against the base URL and rejected with
//! [`ClientError::UrlRequired`] when it would leave it. Authentication is
//! plugged in through [`RequestAuth`].

use std::future::Future;
use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::{Url, form_urlencoded};

use crate::config::DEFAULT_TIMEOUT_SECS;
use crate::error::ClientError;

/// Where a request goes, relative to the client's base URL.
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    /// The base URL itself.
    Root,
    /// Path segments. Each one is escaped like a form value, then they are
    /// joined with `/`.
    Parts(&'a [&'a str]),
    /// A raw path appended to the base URL as is.
    Path(&'a str),
    /// An absolute URL. Must start with the base URL.
    Url(&'a str),
}

/// Adds credentials to an outgoing request.
pub trait RequestAuth: Send + Sync {
    fn authorize(
        &self,
        request: RequestBuilder,
    ) -> impl Future<Output = Result<RequestBuilder, ClientError>> + Send;
}

/// Sends requests without credentials.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAuth;

impl RequestAuth for NoAuth {
    async fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder, ClientError> {
        Ok(request)
    }
}

#[derive(Debug, Clone)]
pub struct RestClient<A = NoAuth> {
    http: reqwest::Client,
    base_url: Url,
    auth: A,
}

impl RestClient {
    /// Creates a client with the default timeout of two seconds.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let mut base = base_url.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base).map_err(|source| ClientError::InvalidUrl {
            url: base.clone(),
            source,
        })?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| ClientError::Http {
                url: base_url.to_string(),
                source,
            })?;

        Ok(Self {
            http,
            base_url,
            auth: NoAuth,
        })
    }
}

impl<A: RequestAuth> RestClient<A> {
    /// Replaces the request authentication, keeping base URL and timeout.
    pub fn with_auth<B: RequestAuth>(self, auth: B) -> RestClient<B> {
        RestClient {
            http: self.http,
            base_url: self.base_url,
            auth,
        }
    }

    /// The base URL, always ending in `/`.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn auth(&self) -> &A {
        &self.auth
    }

    /// Resolves `target` to an absolute URL below the base URL.
    pub fn resolve(&self, target: Target<'_>) -> Result<Url, ClientError> {
        let url = match target {
            Target::Root => return Ok(self.base_url.clone()),
            Target::Parts(parts) => {
                let path = parts
                    .iter()
                    .map(|part| form_urlencoded::byte_serialize(part.as_bytes()).collect())
                    .collect::<Vec<String>>()
                    .join("/");
                self.parse(&format!("{}{}", self.base_url, path))?
            }
            Target::Path(path) => self.parse(&format!("{}{}", self.base_url, path))?,
            Target::Url(url) => self.parse(url)?,
        };

        if !url.as_str().starts_with(self.base_url.as_str()) {
            return Err(ClientError::UrlRequired {
                base_url: self.base_url.to_string(),
            });
        }
        Ok(url)
    }

    fn parse(&self, url: &str) -> Result<Url, ClientError> {
        Url::parse(url).map_err(|source| ClientError::InvalidUrl {
            url: url.to_string(),
            source,
        })
    }

    /// Sends a request, optionally with a JSON body.
    ///
    /// Responses with a non-2xx status become [`ClientError::Status`].
    pub async fn request<T>(
        &self,
        method: Method,
        target: Target<'_>,
        json: Option<&T>,
    ) -> Result<Response, ClientError>
    where
        T: Serialize + ?Sized,
    {
        let url = self.resolve(target)?;

        let mut builder = self.http.request(method.clone(), url.clone());
        if let Some(body) = json {
            builder = builder.json(body);
        }
        let builder = self.auth.authorize(builder).await?;

        tracing::debug!(%method, %url, "Sending request");
        let response = builder.send().await.map_err(|source| ClientError::Http {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%method, %url, status = status.as_u16(), "Request failed");
            return Err(ClientError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    pub async fn get(&self, target: Target<'_>) -> Result<Response, ClientError> {
        self.request::<()>(Method::GET, target, None).await
    }

    pub async fn delete(&self, target: Target<'_>) -> Result<Response, ClientError> {
        self.request::<()>(Method::DELETE, target, None).await
    }

    pub async fn post<T>(&self, target: Target<'_>, body: &T) -> Result<Response, ClientError>
    where
        T: Serialize + ?Sized,
    {
        self.request(Method::POST, target, Some(body)).await
    }

    pub async fn put<T>(&self, target: Target<'_>, body: &T) -> Result<Response, ClientError>
    where
        T: Serialize + ?Sized,
    {
        self.request(Method::PUT, target, Some(body)).await
    }

    /// GETs `target` and deserializes the JSON body.
    pub async fn get_json<R: DeserializeOwned>(&self, target: Target<'_>) -> Result<R, ClientError> {
        decode(self.get(target).await?).await
    }
}

/// Deserializes a JSON response body.
pub async fn decode<R: DeserializeOwned>(response: Response) -> Result<R, ClientError> {
    let url = response.url().to_string();
    response
        .json()
        .await
        .map_err(|source| ClientError::Deserialization { url, source })
}
