//! Dashboard pipeline
//!
//! One run fetches metadata and history for the active ticker, derives the
//! analytics and gathers news. Market data failures abort the run; news and
//! decomposition problems degrade their own section only.

mod candles;
mod render;

pub use candles::render_candles;
pub use render::{
    print_page, render_error, render_page, write_page, Block, LineChart, Page, Section,
    MIN_CHART_HEIGHT, MIN_CHART_WIDTH,
};

use crate::analytics::{
    decompose_series, volatility, BollingerBands, Decomposition, DerivedMetrics,
    MIN_DECOMPOSITION_ROWS, SEASONAL_PERIOD,
};
use crate::market::{
    InstrumentInfo, Interval, MarketDataProvider, MarketError, Period, PriceSeries, Ticker,
};
use crate::news::{NewsArticle, NewsClient};
use crate::telemetry::{increment, record_latency, CounterMetric, LatencyMetric};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

/// Errors that abort a dashboard run
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Market(#[from] MarketError),
}

/// Everything shown for one ticker
#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub ticker: Ticker,
    pub period: Period,
    pub interval: Interval,
    pub info: InstrumentInfo,
    /// Live price, or the latest daily close when the metadata has none
    pub current_price: Option<Decimal>,
    pub history: HistorySection,
}

/// History-dependent part of the page
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HistorySection {
    /// Provider returned no bars
    Empty,
    Ready(Box<HistoryReport>),
}

/// Analytics over a non-empty series
#[derive(Debug, Clone, Serialize)]
pub struct HistoryReport {
    pub series: PriceSeries,
    pub metrics: DerivedMetrics,
    /// Fraction, not percent
    pub volatility: f64,
    pub bollinger: BollingerBands,
    pub news: Vec<NewsArticle>,
    pub decomposition: DecompositionSection,
}

/// Outcome of the seasonal decomposition
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DecompositionSection {
    Ready(Decomposition),
    /// Too few usable closes
    Insufficient { available: usize, required: usize },
    Failed { message: String },
}

/// Runs the fetch and analytics pipeline
pub struct Dashboard {
    market: Arc<dyn MarketDataProvider>,
    news: NewsClient,
}

impl Dashboard {
    pub fn new(market: Arc<dyn MarketDataProvider>, news: NewsClient) -> Self {
        Self { market, news }
    }

    /// Build the report for `ticker` over `period` at `interval`
    pub async fn run(
        &self,
        ticker: &Ticker,
        period: Period,
        interval: Interval,
    ) -> Result<DashboardReport, PipelineError> {
        let started = Instant::now();
        tracing::info!(ticker = %ticker, %period, %interval, "Dashboard run started");

        let result = self.build(ticker, period, interval).await;
        let elapsed = started.elapsed();
        record_latency(LatencyMetric::Pipeline, elapsed);

        match &result {
            Ok(_) => tracing::info!(
                ticker = %ticker,
                elapsed_ms = elapsed.as_millis() as u64,
                "Dashboard run complete"
            ),
            Err(e) => {
                increment(CounterMetric::FetchFailure);
                tracing::info!(ticker = %ticker, error = %e, "Dashboard run failed");
            }
        }
        result
    }

    async fn build(
        &self,
        ticker: &Ticker,
        period: Period,
        interval: Interval,
    ) -> Result<DashboardReport, PipelineError> {
        let started = Instant::now();
        let info = self.market.instrument_info(ticker).await?;
        record_latency(LatencyMetric::InstrumentInfo, started.elapsed());

        let current_price = match info.live_price() {
            Some(price) => Some(price),
            None => self.fallback_price(ticker).await?,
        };

        let started = Instant::now();
        let series = self.market.history(ticker, period, interval).await?;
        record_latency(LatencyMetric::History, started.elapsed());

        let history = if series.is_empty() {
            tracing::info!(ticker = %ticker, "No history returned");
            HistorySection::Empty
        } else {
            let news = self.fetch_news(ticker).await;
            HistorySection::Ready(Box::new(analyze(series, news)))
        };

        Ok(DashboardReport {
            ticker: ticker.clone(),
            period,
            interval,
            info,
            current_price,
            history,
        })
    }

    /// Latest close from a one-day daily history
    async fn fallback_price(&self, ticker: &Ticker) -> Result<Option<Decimal>, MarketError> {
        let today = self
            .market
            .history(ticker, Period::OneDay, Interval::Daily)
            .await?;
        let price = today
            .last_close()
            .and_then(Decimal::from_f64)
            .filter(|price| !price.is_zero());
        tracing::debug!(ticker = %ticker, ?price, "Price taken from latest close");
        Ok(price)
    }

    async fn fetch_news(&self, ticker: &Ticker) -> Vec<NewsArticle> {
        let started = Instant::now();
        let result = self.news.fetch(ticker).await;
        record_latency(LatencyMetric::News, started.elapsed());

        result.unwrap_or_else(|e| {
            increment(CounterMetric::NewsFailure);
            tracing::warn!(ticker = %ticker, error = %e, "News search failed");
            Vec::new()
        })
    }
}

/// Derive every history-dependent section from a non-empty series
pub fn analyze(series: PriceSeries, news: Vec<NewsArticle>) -> HistoryReport {
    let metrics = DerivedMetrics::from_series(&series);
    let volatility = volatility(&series);
    let bollinger = BollingerBands::standard(&series.closes());
    let decomposition = decomposition_section(&series);

    HistoryReport {
        series,
        metrics,
        volatility,
        bollinger,
        news,
        decomposition,
    }
}

fn decomposition_section(series: &PriceSeries) -> DecompositionSection {
    let available = series.closes().iter().filter(|c| c.is_finite()).count();
    if available < MIN_DECOMPOSITION_ROWS {
        return DecompositionSection::Insufficient {
            available,
            required: MIN_DECOMPOSITION_ROWS,
        };
    }

    match decompose_series(series, SEASONAL_PERIOD) {
        Ok(decomposition) => DecompositionSection::Ready(decomposition),
        Err(e) => {
            tracing::warn!(ticker = %series.ticker, error = %e, "Decomposition failed");
            DecompositionSection::Failed {
                message: e.to_string(),
            }
        }
    }
}
