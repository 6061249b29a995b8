//! Market data module
//!
//! Instrument metadata and OHLCV history from Yahoo Finance, with an optional
//! short-lived cache in front of the provider.

mod cache;
mod types;
mod yahoo;

pub use cache::CachedProvider;
pub use types::{
    Bar, InstrumentInfo, Interval, MarketError, ParseOptionError, Period, PriceSeries, Ticker,
};
pub use yahoo::{YahooClient, YahooConfig, YAHOO_API_URL, YAHOO_CONSENT_URL};

use async_trait::async_trait;

/// Source of instrument metadata and price history
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetch descriptive metadata for a ticker
    async fn instrument_info(&self, ticker: &Ticker) -> Result<InstrumentInfo, MarketError>;

    /// Fetch bars for a ticker over `period` at `interval`
    async fn history(
        &self,
        ticker: &Ticker,
        period: Period,
        interval: Interval,
    ) -> Result<PriceSeries, MarketError>;
}
