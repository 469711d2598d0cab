//! HTTP exchange behind the journal client.
//!
//! The client never talks to the network directly: it hands a fully built
//! [`ApiRequest`] to a [`Transport`] and gets back status + bytes. Production
//! code uses [`ReqwestTransport`]; tests swap in a recording spy.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::HeaderMap, Client, Method, StatusCode, Url};
use tracing::debug;

use super::error::TransportError;

/// HTTP request timeout in seconds.
/// 30s allows for slow uploads while failing fast enough for interactive use.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// A request ready to be sent, described as plain data.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

/// Raw response as returned by the transport.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform one HTTP exchange. Non-success statuses are a successful
    /// exchange; only network-level failures are errors.
    async fn send(&self, request: ApiRequest) -> Result<HttpResponse, TransportError>;
}

/// Transport backed by a pooled `reqwest::Client`.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> reqwest::Result<Self> {
        Self::with_timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
    }

    pub fn with_timeout(timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Wrap an already configured client, sharing its connection pool.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<HttpResponse, TransportError> {
        let ApiRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let mut builder = self.client.request(method, url).headers(headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        debug!(status = status.as_u16(), bytes = body.len(), "Response received");

        Ok(HttpResponse::new(status, body.to_vec()))
    }
}
