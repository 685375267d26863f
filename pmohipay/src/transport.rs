//! HTTP transport used by the client
//!
//! The SOAP layer only needs "POST this body with these headers to this URL and give
//! me back the status and the raw text". [`Transport`] is that seam; the default
//! implementation is backed by `reqwest`.

use crate::error::TransportError;
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::HeaderMap;
use std::time::Duration;
use tracing::debug;

/// One outbound SOAP call
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub headers: HeaderMap,
    pub body: String,
    pub timeout: Duration,
}

/// Raw HTTP response, kept for diagnostics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Sends a single request and returns whatever the server answered
///
/// Implementations must not interpret the status code: a 500 carrying a SOAP body
/// is a valid answer. Only connection-level failures are errors.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(&self, request: HttpRequest) -> Result<RawResponse, TransportError>;
}

/// [`Transport`] backed by a `reqwest::Client`
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a preconfigured client (proxy, TLS roots, ...)
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn post(&self, request: HttpRequest) -> Result<RawResponse, TransportError> {
        let response = self
            .client
            .post(&request.url)
            .headers(request.headers)
            .timeout(request.timeout)
            .body(request.body)
            .send()
            .await?;

        let status = response.status().as_u16();
        debug!("Response status: {}", status);

        let body = response
            .text()
            .await
            .map_err(|source| TransportError::Body { status, source })?;
        Ok(RawResponse { status, body })
    }
}
