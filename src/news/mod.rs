//! Financial news search
//!
//! Queries the NewsAPI `everything` endpoint for a ticker, restricted to a
//! fixed allow-list of financial publishers, newest first.

mod types;

pub use types::{NewsArticle, NewsError};

use crate::http::{HttpRequest, HttpTransport, ReqwestTransport};
use crate::market::Ticker;
use std::sync::Arc;
use std::time::Duration;
use types::SearchResponse;

/// NewsAPI search endpoint
pub const NEWS_API_URL: &str = "https://newsapi.org/v2/everything";

/// Publishers searched by default
pub const FINANCIAL_DOMAINS: [&str; 6] = [
    "bloomberg.com",
    "cnbc.com",
    "reuters.com",
    "wsj.com",
    "marketwatch.com",
    "ft.com",
];

/// Configuration for the news client
#[derive(Clone)]
pub struct NewsApiConfig {
    pub base_url: String,
    pub api_key: String,
    pub domains: Vec<String>,
    pub language: String,
    /// Maximum articles returned per search
    pub max_results: usize,
    pub timeout: Duration,
}

impl NewsApiConfig {
    /// Default settings with the given API key
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            base_url: NEWS_API_URL.to_string(),
            api_key: api_key.into(),
            domains: FINANCIAL_DOMAINS.iter().map(|d| d.to_string()).collect(),
            language: "en".to_string(),
            max_results: 3,
            timeout: Duration::from_secs(10),
        }
    }
}

impl std::fmt::Debug for NewsApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewsApiConfig")
            .field("base_url", &self.base_url)
            .field("domains", &self.domains)
            .field("language", &self.language)
            .field("max_results", &self.max_results)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Client for the news search API
pub struct NewsClient {
    config: NewsApiConfig,
    transport: Arc<dyn HttpTransport>,
}

impl NewsClient {
    /// Create a client backed by a reqwest transport
    pub fn new(config: NewsApiConfig) -> Result<Self, NewsError> {
        let transport = ReqwestTransport::new(config.timeout)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a client over an arbitrary transport
    pub fn with_transport(config: NewsApiConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self { config, transport }
    }

    /// Latest articles mentioning `ticker`, at most `max_results`
    ///
    /// A non-success status yields an empty list.
    pub async fn fetch(&self, ticker: &Ticker) -> Result<Vec<NewsArticle>, NewsError> {
        let request = HttpRequest::get(&self.config.base_url)
            .query("q", ticker.as_str())
            .query("apiKey", &self.config.api_key)
            .query("language", &self.config.language)
            .query("sortBy", "publishedAt")
            .query("domains", self.config.domains.join(","));

        tracing::debug!(ticker = %ticker, "Searching news");

        let response = self.transport.get(request).await?;
        if !response.is_success() {
            tracing::debug!(ticker = %ticker, status = response.status, "News search unsuccessful");
            return Ok(Vec::new());
        }

        let parsed: SearchResponse = serde_json::from_str(&response.body)?;
        let articles: Vec<NewsArticle> = parsed
            .articles
            .into_iter()
            .take(self.config.max_results)
            .map(NewsArticle::from)
            .collect();

        tracing::debug!(ticker = %ticker, count = articles.len(), "News search complete");
        Ok(articles)
    }
}
