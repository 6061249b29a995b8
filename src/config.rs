//! Configuration types for tickerscope

use crate::dashboard::{MIN_CHART_HEIGHT, MIN_CHART_WIDTH};
use crate::market::{Interval, Period, Ticker, YahooConfig, YAHOO_API_URL, YAHOO_CONSENT_URL};
use crate::news::{NewsApiConfig, FINANCIAL_DOMAINS, NEWS_API_URL};
use crate::session::SHORTLIST;
use crate::telemetry::LogFormat;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Config file is not valid TOML for this schema
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    /// Required secret is absent from the environment
    #[error("missing secret: set the {name} environment variable")]
    MissingSecret { name: String },
    /// A value is out of range
    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Root configuration structure
///
/// Every section is optional; omitted sections take their defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub market: MarketConfig,
    pub news: NewsConfig,
    pub cache: CacheConfig,
    pub dashboard: DashboardConfig,
    pub telemetry: TelemetryConfig,
}

/// Market data provider configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    pub base_url: String,
    pub consent_url: String,
    pub timeout_secs: u64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            base_url: YAHOO_API_URL.to_string(),
            consent_url: YAHOO_CONSENT_URL.to_string(),
            timeout_secs: 10,
        }
    }
}

impl MarketConfig {
    /// Client configuration for the Yahoo provider
    pub fn yahoo(&self) -> YahooConfig {
        YahooConfig {
            base_url: self.base_url.trim_end_matches('/').to_string(),
            consent_url: self.consent_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

/// News search configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
    /// Search endpoint
    pub base_url: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Publisher allow-list
    pub domains: Vec<String>,
    /// Article language
    pub language: String,
    /// Maximum articles shown
    pub max_results: usize,
    pub timeout_secs: u64,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            base_url: NEWS_API_URL.to_string(),
            api_key_env: "NEWS_API_KEY".to_string(),
            domains: FINANCIAL_DOMAINS.iter().map(|d| d.to_string()).collect(),
            language: "en".to_string(),
            max_results: 3,
            timeout_secs: 10,
        }
    }
}

impl NewsConfig {
    /// Client configuration for the news search API
    pub fn client_config(&self, api_key: NewsApiKey) -> NewsApiConfig {
        NewsApiConfig {
            base_url: self.base_url.clone(),
            api_key: api_key.expose().to_string(),
            domains: self.domains.clone(),
            language: self.language.clone(),
            max_results: self.max_results,
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

/// Market data cache configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: 60,
        }
    }
}

impl CacheConfig {
    /// Effective TTL; zero when caching is disabled
    pub fn ttl(&self) -> Duration {
        if self.enabled {
            Duration::from_secs(self.ttl_secs)
        } else {
            Duration::ZERO
        }
    }
}

/// Dashboard presentation configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub default_period: Period,
    pub default_interval: Interval,
    /// Quick-pick tickers offered in the session
    pub shortlist: Vec<String>,
    /// Chart width in characters
    pub chart_width: u32,
    /// Chart height in characters
    pub chart_height: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            default_period: Period::SixMonths,
            default_interval: Interval::Daily,
            shortlist: SHORTLIST.iter().map(|s| s.to_string()).collect(),
            chart_width: 120,
            chart_height: 30,
        }
    }
}

impl DashboardConfig {
    /// Shortlist as normalized tickers
    pub fn shortlist_tickers(&self) -> Vec<Ticker> {
        self.shortlist.iter().filter_map(|s| Ticker::new(s)).collect()
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub log_format: LogFormat,
    /// Serve Prometheus metrics on this port when set
    pub metrics_port: Option<u16>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            log_format: LogFormat::Pretty,
            metrics_port: None,
        }
    }
}

/// News API key read from the environment
#[derive(Clone, PartialEq, Eq)]
pub struct NewsApiKey(String);

impl NewsApiKey {
    /// Resolve the key named `name` through `lookup`
    pub fn resolve(
        name: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        lookup(name)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(Self)
            .ok_or_else(|| ConfigError::MissingSecret {
                name: name.to_string(),
            })
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for NewsApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NewsApiKey(***)")
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the dashboard cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.news.max_results == 0 {
            return Err(ConfigError::Invalid("news.max_results must be at least 1".into()));
        }
        if self.market.timeout_secs == 0 || self.news.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeouts must be at least 1 second".into()));
        }
        if self.dashboard.chart_width < MIN_CHART_WIDTH
            || self.dashboard.chart_height < MIN_CHART_HEIGHT
        {
            return Err(ConfigError::Invalid(format!(
                "charts must be at least {MIN_CHART_WIDTH} columns by {MIN_CHART_HEIGHT} rows"
            )));
        }
        if !Period::SELECTABLE.contains(&self.dashboard.default_period) {
            return Err(ConfigError::Invalid(format!(
                "dashboard.default_period '{}' is not selectable",
                self.dashboard.default_period
            )));
        }
        if self.dashboard.shortlist_tickers().is_empty() {
            return Err(ConfigError::Invalid("dashboard.shortlist is empty".into()));
        }
        Ok(())
    }

    /// Read the news API key from the process environment
    pub fn news_api_key(&self) -> Result<NewsApiKey, ConfigError> {
        NewsApiKey::resolve(&self.news.api_key_env, |name| std::env::var(name).ok())
    }
}
