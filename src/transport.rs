//! HTTP transport.
//!
//! The fetcher only needs "send a request, get back status, headers and
//! bytes, or a transport error". [`Transport`] is that seam; the
//! [`ReqwestTransport`] implementation is the default.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Request, StatusCode};

use crate::error::{BoxError, FetchError, Result};

const USER_AGENT: &str = concat!("pagefetch/", env!("CARGO_PKG_VERSION"));

/// A raw HTTP response, before any validation.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Body bytes; `None` when the transport received no body at all.
    pub body: Option<Bytes>,
}

impl RawResponse {
    /// A response with the given status, no headers and no body.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Set the body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Add a header.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// Sends one request and returns the raw response.
///
/// Implementations complete at most once per call and must not retry.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn send(&self, request: Request) -> core::result::Result<RawResponse, BoxError>;
}

/// [`Transport`] backed by a `reqwest` connection pool.
///
/// Cheaply cloneable; clones share the pool.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: Client,
}

impl ReqwestTransport {
    /// Create a transport with the default user agent.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn new() -> Result<Self> {
        Self::with_user_agent(USER_AGENT)
    }

    /// Create a transport sending `user_agent`.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn with_user_agent(user_agent: &str) -> Result<Self> {
        let http = Client::builder()
            .user_agent(user_agent)
            .brotli(true)
            .gzip(true)
            .deflate(true)
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(FetchError::from)?;

        Ok(Self { http })
    }

    /// Wrap an existing client.
    pub fn with_client(http: Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[tracing::instrument(skip_all, fields(method = %request.method(), url = %request.url()))]
    async fn send(&self, request: Request) -> core::result::Result<RawResponse, BoxError> {
        let response = self.http.execute(request).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        tracing::debug!(%status, bytes = body.len(), "response received");

        Ok(RawResponse {
            status,
            headers,
            body: Some(body),
        })
    }
}

/// Default user agent sent by [`ReqwestTransport::new`].
pub fn default_user_agent() -> &'static str {
    USER_AGENT
}
