//! Market data types

use crate::http::HttpError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Market data errors
#[derive(Debug, Error)]
pub enum MarketError {
    /// Network failure before any response arrived
    #[error(transparent)]
    Transport(#[from] HttpError),
    /// Provider answered with a non-success status
    #[error("{provider} returned HTTP {status} for {symbol}")]
    Status {
        provider: &'static str,
        symbol: String,
        status: u16,
    },
    /// Provider has no data for the symbol
    #[error("no data found for symbol {0}")]
    NotFound(String),
    /// Provider reported an error in the payload
    #[error("provider error: {0}")]
    Provider(String),
    /// Payload could not be decoded
    #[error("failed to decode provider response: {0}")]
    Decode(String),
}

/// Rejected period or interval value
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unsupported {kind} '{value}', expected one of: {expected}")]
pub struct ParseOptionError {
    kind: &'static str,
    value: String,
    expected: &'static str,
}

/// A ticker symbol, trimmed and upper-cased
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Ticker(String);

impl Ticker {
    /// Normalize a raw symbol; blank input yields `None`
    pub fn new(raw: &str) -> Option<Self> {
        let symbol = raw.trim();
        if symbol.is_empty() {
            return None;
        }
        Some(Self(symbol.to_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// History range requested from the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Period {
    /// Single session, used for the last-close price fallback
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[default]
    #[serde(rename = "6mo")]
    SixMonths,
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "5y")]
    FiveYears,
    #[serde(rename = "max")]
    Max,
}

impl Period {
    /// Periods offered by the period selector
    pub const SELECTABLE: [Period; 6] = [
        Period::OneMonth,
        Period::ThreeMonths,
        Period::SixMonths,
        Period::OneYear,
        Period::FiveYears,
        Period::Max,
    ];

    /// Provider range code
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::OneDay => "1d",
            Period::OneMonth => "1mo",
            Period::ThreeMonths => "3mo",
            Period::SixMonths => "6mo",
            Period::OneYear => "1y",
            Period::FiveYears => "5y",
            Period::Max => "max",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1d" => Ok(Period::OneDay),
            "1mo" => Ok(Period::OneMonth),
            "3mo" => Ok(Period::ThreeMonths),
            "6mo" => Ok(Period::SixMonths),
            "1y" => Ok(Period::OneYear),
            "5y" => Ok(Period::FiveYears),
            "max" => Ok(Period::Max),
            _ => Err(ParseOptionError {
                kind: "period",
                value: s.to_string(),
                expected: "1mo, 3mo, 6mo, 1y, 5y, max",
            }),
        }
    }
}

/// Bar size requested from the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Interval {
    #[default]
    #[serde(rename = "1d")]
    Daily,
    #[serde(rename = "1wk")]
    Weekly,
    #[serde(rename = "1mo")]
    Monthly,
}

impl Interval {
    /// Intervals offered by the interval selector
    pub const SELECTABLE: [Interval; 3] = [Interval::Daily, Interval::Weekly, Interval::Monthly];

    /// Provider interval code
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Daily => "1d",
            Interval::Weekly => "1wk",
            Interval::Monthly => "1mo",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1d" => Ok(Interval::Daily),
            "1wk" => Ok(Interval::Weekly),
            "1mo" => Ok(Interval::Monthly),
            _ => Err(ParseOptionError {
                kind: "interval",
                value: s.to_string(),
                expected: "1d, 1wk, 1mo",
            }),
        }
    }
}

/// Descriptive metadata for an instrument
///
/// Every field is optional; providers frequently omit some of them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InstrumentInfo {
    /// Company or fund name
    pub long_name: Option<String>,
    /// Business sector
    pub sector: Option<String>,
    /// Listing exchange code
    pub exchange: Option<String>,
    /// Market capitalization in USD
    pub market_cap: Option<Decimal>,
    /// Live price reported with the metadata
    pub regular_market_price: Option<Decimal>,
}

impl InstrumentInfo {
    /// Market capitalization in billions, rounded to cents; zero counts as absent
    pub fn market_cap_billions(&self) -> Option<Decimal> {
        self.market_cap
            .filter(|cap| !cap.is_zero())
            .map(|cap| (cap / dec!(1000000000)).round_dp(2))
    }

    /// Live price if present and non-zero
    pub fn live_price(&self) -> Option<Decimal> {
        self.regular_market_price.filter(|price| !price.is_zero())
    }
}

/// One OHLCV bar
///
/// Values the provider left out are stored as `NaN`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Time-ordered bars for one ticker, period and interval
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    pub ticker: Ticker,
    pub period: Period,
    pub interval: Interval,
    bars: Vec<Bar>,
}

impl PriceSeries {
    /// Build a series, sorting bars by time and keeping the last bar per timestamp
    pub fn new(ticker: Ticker, period: Period, interval: Interval, mut bars: Vec<Bar>) -> Self {
        bars.sort_by_key(|bar| bar.timestamp);

        let mut ordered: Vec<Bar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match ordered.last_mut() {
                Some(last) if last.timestamp == bar.timestamp => *last = bar,
                _ => ordered.push(bar),
            }
        }

        Self {
            ticker,
            period,
            interval,
            bars: ordered,
        }
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Close column
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|bar| bar.close).collect()
    }

    /// Volume column
    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|bar| bar.volume).collect()
    }

    /// Timestamp index
    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.bars.iter().map(|bar| bar.timestamp).collect()
    }

    /// Close of the final bar, if it is a number
    pub fn last_close(&self) -> Option<f64> {
        self.bars
            .last()
            .map(|bar| bar.close)
            .filter(|close| close.is_finite())
    }
}
