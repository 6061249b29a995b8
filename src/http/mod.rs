//! HTTP transport shared by the market-data and news clients
//!
//! Providers talk to the network through [`HttpTransport`] so they can be
//! driven by [`CannedTransport`] in tests and offline runs.

mod canned;

pub use canned::CannedTransport;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Transport-level failure (no HTTP status was received)
#[derive(Debug, Error)]
pub enum HttpError {
    /// Request exceeded the configured timeout
    #[error("request to {url} timed out")]
    Timeout { url: String },
    /// Connection, TLS or body read failure
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },
}

/// Outgoing GET request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Absolute URL without query string
    pub url: String,
    /// Query parameters, encoded by the transport
    pub query: Vec<(String, String)>,
    /// Extra request headers
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    /// Create a GET request for the given URL
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
        }
    }

    /// Append a query parameter
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Append a header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Look up a query parameter by name
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Response status and body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    /// 200 response with the given body
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    /// Response with an arbitrary status and empty body
    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: String::new(),
        }
    }

    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Async GET transport
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Execute a GET request and return the raw response
    async fn get(&self, request: HttpRequest) -> Result<HttpResponse, HttpError>;
}

/// Production transport backed by reqwest
///
/// Keeps a cookie store so the Yahoo consent cookie survives between calls.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport whose requests time out after `timeout`
    pub fn new(timeout: Duration) -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .cookie_store(true)
            .user_agent(concat!("tickerscope/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HttpError::Transport {
                url: String::new(),
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let url = request.url.clone();
        let mut builder = self.client.get(&request.url).query(&request.query);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await.map_err(|e| map_reqwest_error(&url, e))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| map_reqwest_error(&url, e))?;

        tracing::trace!(url = %url, status, bytes = body.len(), "HTTP response");

        Ok(HttpResponse { status, body })
    }
}

fn map_reqwest_error(url: &str, err: reqwest::Error) -> HttpError {
    if err.is_timeout() {
        HttpError::Timeout {
            url: url.to_string(),
        }
    } else {
        HttpError::Transport {
            url: url.to_string(),
            message: err.to_string(),
        }
    }
}
