//! Yahoo Finance client
//!
//! Metadata comes from the `quoteSummary` endpoint (price and asset profile
//! modules), which needs a session crumb. History comes from the v8 chart
//! endpoint.

use super::{Bar, InstrumentInfo, Interval, MarketDataProvider, MarketError, Period, PriceSeries, Ticker};
use crate::http::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Yahoo Finance query API base URL
pub const YAHOO_API_URL: &str = "https://query1.finance.yahoo.com";

/// Endpoint that hands out the consent cookie the crumb is bound to
pub const YAHOO_CONSENT_URL: &str = "https://fc.yahoo.com";

const PROVIDER: &str = "yahoo";

/// Configuration for the Yahoo client
#[derive(Debug, Clone)]
pub struct YahooConfig {
    /// Base URL for the query API
    pub base_url: String,
    /// Cookie consent URL
    pub consent_url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            base_url: YAHOO_API_URL.to_string(),
            consent_url: YAHOO_CONSENT_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Client for Yahoo Finance metadata and chart endpoints
pub struct YahooClient {
    config: YahooConfig,
    transport: Arc<dyn HttpTransport>,
    crumb: Mutex<Option<String>>,
}

impl YahooClient {
    /// Create a client backed by a reqwest transport
    pub fn new(config: YahooConfig) -> Result<Self, MarketError> {
        let transport = ReqwestTransport::new(config.timeout)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a client over an arbitrary transport
    pub fn with_transport(config: YahooConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            config,
            transport,
            crumb: Mutex::new(None),
        }
    }

    /// Return the cached crumb, fetching one on first use
    async fn crumb(&self) -> Result<String, MarketError> {
        let mut cached = self.crumb.lock().await;
        if let Some(crumb) = cached.as_ref() {
            return Ok(crumb.clone());
        }

        if let Err(e) = self
            .transport
            .get(HttpRequest::get(&self.config.consent_url))
            .await
        {
            tracing::debug!(error = %e, "Yahoo consent request failed");
        }

        let url = format!("{}/v1/test/getcrumb", self.config.base_url);
        let response = self.transport.get(HttpRequest::get(url)).await?;
        let crumb = response.body.trim().to_string();

        if !response.is_success() || crumb.is_empty() || crumb.contains('<') {
            return Err(MarketError::Provider(format!(
                "could not obtain Yahoo session crumb (HTTP {})",
                response.status
            )));
        }

        tracing::debug!("Obtained Yahoo session crumb");
        *cached = Some(crumb.clone());
        Ok(crumb)
    }

    async fn invalidate_crumb(&self) {
        *self.crumb.lock().await = None;
    }

    async fn request_summary(&self, ticker: &Ticker) -> Result<HttpResponse, MarketError> {
        let crumb = self.crumb().await?;
        let url = format!(
            "{}/v10/finance/quoteSummary/{}",
            self.config.base_url,
            ticker.as_str()
        );
        let request = HttpRequest::get(url)
            .query("modules", "price,assetProfile")
            .query("crumb", crumb)
            .header("referer", "https://finance.yahoo.com/");

        Ok(self.transport.get(request).await?)
    }
}

#[async_trait]
impl MarketDataProvider for YahooClient {
    async fn instrument_info(&self, ticker: &Ticker) -> Result<InstrumentInfo, MarketError> {
        tracing::debug!(ticker = %ticker, "Fetching instrument info from Yahoo");

        let mut response = self.request_summary(ticker).await?;
        if response.status == 401 {
            // Crumbs expire with the consent cookie; refresh once
            self.invalidate_crumb().await;
            response = self.request_summary(ticker).await?;
        }

        parse_summary(ticker, &response)
    }

    async fn history(
        &self,
        ticker: &Ticker,
        period: Period,
        interval: Interval,
    ) -> Result<PriceSeries, MarketError> {
        let url = format!(
            "{}/v8/finance/chart/{}",
            self.config.base_url,
            ticker.as_str()
        );
        let request = HttpRequest::get(url)
            .query("range", period.as_str())
            .query("interval", interval.as_str())
            .query("includePrePost", "false")
            .query("events", "div,split")
            .header("referer", "https://finance.yahoo.com/");

        tracing::debug!(
            ticker = %ticker,
            period = %period,
            interval = %interval,
            "Fetching price history from Yahoo"
        );

        let response = self.transport.get(request).await?;
        let bars = parse_chart(ticker, &response)?;

        tracing::debug!(ticker = %ticker, bars = bars.len(), "Received price history");

        Ok(PriceSeries::new(ticker.clone(), period, interval, bars))
    }
}

/// Error object embedded in Yahoo payloads
#[derive(Debug, Deserialize)]
struct YahooError {
    code: Option<String>,
    description: Option<String>,
}

impl YahooError {
    fn into_market_error(self, ticker: &Ticker) -> MarketError {
        let description = self
            .description
            .unwrap_or_else(|| "unknown error".to_string());
        match self.code.as_deref() {
            Some("Not Found") => MarketError::NotFound(ticker.to_string()),
            _ => MarketError::Provider(description),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryResponse {
    quote_summary: QuoteSummary,
}

#[derive(Debug, Deserialize)]
struct QuoteSummary {
    result: Option<Vec<QuoteSummaryResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryResult {
    price: Option<PriceModule>,
    asset_profile: Option<AssetProfileModule>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceModule {
    long_name: Option<String>,
    short_name: Option<String>,
    exchange: Option<String>,
    exchange_name: Option<String>,
    market_cap: Option<RawValue>,
    regular_market_price: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
struct AssetProfileModule {
    sector: Option<String>,
}

/// Numeric value wrapped as `{"raw": .., "fmt": ..}`; empty objects mean absent
#[derive(Debug, Deserialize)]
struct RawValue {
    raw: Option<f64>,
}

impl RawValue {
    fn to_decimal(&self) -> Option<Decimal> {
        self.raw.and_then(|v| Decimal::try_from(v).ok())
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

fn parse_summary(ticker: &Ticker, response: &HttpResponse) -> Result<InstrumentInfo, MarketError> {
    // Yahoo reports unknown symbols as 404 with a JSON error body
    let parsed: Result<QuoteSummaryResponse, _> = serde_json::from_str(&response.body);

    let summary = match parsed {
        Ok(parsed) => parsed.quote_summary,
        Err(e) if response.is_success() => return Err(MarketError::Decode(e.to_string())),
        Err(_) => return Err(status_error(ticker, response.status)),
    };

    if let Some(error) = summary.error {
        return Err(error.into_market_error(ticker));
    }
    if !response.is_success() {
        return Err(status_error(ticker, response.status));
    }

    let result = summary
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| MarketError::NotFound(ticker.to_string()))?;

    let price = result.price;
    let sector = result.asset_profile.and_then(|profile| profile.sector);

    Ok(match price {
        Some(price) => InstrumentInfo {
            long_name: price.long_name.or(price.short_name),
            sector,
            exchange: price.exchange.or(price.exchange_name),
            market_cap: price.market_cap.as_ref().and_then(RawValue::to_decimal),
            regular_market_price: price
                .regular_market_price
                .as_ref()
                .and_then(RawValue::to_decimal),
        },
        None => InstrumentInfo {
            sector,
            ..Default::default()
        },
    })
}

fn parse_chart(ticker: &Ticker, response: &HttpResponse) -> Result<Vec<Bar>, MarketError> {
    let parsed: Result<ChartResponse, _> = serde_json::from_str(&response.body);

    let chart = match parsed {
        Ok(parsed) => parsed.chart,
        Err(e) if response.is_success() => return Err(MarketError::Decode(e.to_string())),
        Err(_) => return Err(status_error(ticker, response.status)),
    };

    if let Some(error) = chart.error {
        return Err(error.into_market_error(ticker));
    }
    if !response.is_success() {
        return Err(status_error(ticker, response.status));
    }

    let Some(result) = chart.result.and_then(|results| results.into_iter().next()) else {
        return Ok(Vec::new());
    };
    let Some(timestamps) = result.timestamp else {
        return Ok(Vec::new());
    };
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();

    let value = |column: &[Option<f64>], i: usize| column.get(i).copied().flatten();

    let bars = timestamps
        .iter()
        .enumerate()
        .filter_map(|(i, &ts)| {
            let open = value(&quote.open, i);
            let high = value(&quote.high, i);
            let low = value(&quote.low, i);
            let close = value(&quote.close, i);

            // Rows without any price are placeholders for halted sessions
            if open.is_none() && high.is_none() && low.is_none() && close.is_none() {
                return None;
            }

            let timestamp = Utc.timestamp_opt(ts, 0).single()?;
            Some(Bar {
                timestamp,
                open: open.unwrap_or(f64::NAN),
                high: high.unwrap_or(f64::NAN),
                low: low.unwrap_or(f64::NAN),
                close: close.unwrap_or(f64::NAN),
                volume: value(&quote.volume, i).unwrap_or(f64::NAN),
            })
        })
        .collect();

    Ok(bars)
}

fn status_error(ticker: &Ticker, status: u16) -> MarketError {
    if status == 404 {
        MarketError::NotFound(ticker.to_string())
    } else {
        MarketError::Status {
            provider: PROVIDER,
            symbol: ticker.to_string(),
            status,
        }
    }
}
