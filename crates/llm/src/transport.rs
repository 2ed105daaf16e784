//! HTTP transport seam for provider calls.
//!
//! Providers describe a request as plain data; a transport sends it. The
//! production transport is `reqwest`; tests substitute a mock so they can
//! count attempts without touching the network.

use async_trait::async_trait;
use deckgen_core::{Error, Result};
#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;
use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// A JSON POST request to a provider endpoint.
#[derive(Clone, PartialEq)]
pub struct HttpRequest {
    /// Provider label used in error messages.
    pub provider: &'static str,
    pub url: String,
    pub headers: Vec<(String, String)>,
    /// Query parameters appended by the transport.
    pub query: Vec<(String, String)>,
    pub body: Value,
}

impl HttpRequest {
    /// Create a request with no headers or query parameters.
    pub fn post(provider: &'static str, url: impl Into<String>, body: Value) -> Self {
        Self {
            provider,
            url: url.into(),
            headers: Vec::new(),
            query: Vec::new(),
            body,
        }
    }

    /// Add a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Add a query parameter.
    pub fn query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Look up a header value by case-insensitive name.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

// Header and query values carry credentials, so only their names are printed.
impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: Vec<&str> = self.headers.iter().map(|(k, _)| k.as_str()).collect();
        let query: Vec<&str> = self.query.iter().map(|(k, _)| k.as_str()).collect();
        f.debug_struct("HttpRequest")
            .field("provider", &self.provider)
            .field("url", &self.url)
            .field("headers", &headers)
            .field("query", &query)
            .finish_non_exhaustive()
    }
}

/// Status and raw body of a provider response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends provider requests.
///
/// A transport reports network-level failures as [`Error::Transport`] and
/// returns every HTTP response, whatever its status, as `Ok`.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn post_json(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// `reqwest`-backed transport with a bounded per-request timeout.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post_json(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut builder = self.client.post(&request.url).json(&request.body);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        let transport_error = |e: reqwest::Error| Error::Transport {
            provider: request.provider.to_string(),
            // Strip the URL: it may carry a credential in its query string.
            message: e.without_url().to_string(),
        };

        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(transport_error)?;

        Ok(HttpResponse { status, body })
    }
}
