//! News types

use crate::http::HttpError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// News search errors
///
/// Non-success statuses are not errors; they yield an empty article list.
#[derive(Debug, Error)]
pub enum NewsError {
    #[error(transparent)]
    Transport(#[from] HttpError),
    #[error("failed to decode news response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A news headline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewsArticle {
    pub title: String,
    /// Publisher name
    pub source: String,
    pub published_at: Option<DateTime<Utc>>,
    pub url: String,
    pub description: Option<String>,
}

/// Search response body
#[derive(Debug, Deserialize)]
pub(super) struct SearchResponse {
    #[serde(default)]
    pub articles: Vec<WireArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct WireArticle {
    pub title: Option<String>,
    pub url: Option<String>,
    pub source: Option<WireSource>,
    pub published_at: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct WireSource {
    pub name: Option<String>,
}

impl From<WireArticle> for NewsArticle {
    fn from(wire: WireArticle) -> Self {
        let published_at = wire
            .published_at
            .as_deref()
            .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
            .map(|dt| dt.with_timezone(&Utc));

        Self {
            title: wire.title.unwrap_or_else(|| "(untitled)".to_string()),
            source: wire
                .source
                .and_then(|s| s.name)
                .unwrap_or_else(|| "Unknown".to_string()),
            published_at,
            url: wire.url.unwrap_or_default(),
            description: wire.description.filter(|d| !d.trim().is_empty()),
        }
    }
}
