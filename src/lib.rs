//! tickerscope: terminal dashboard for a single stock ticker
//!
//! This library provides the core components for:
//! - Ticker selection and session state
//! - Market metadata and price history from Yahoo Finance
//! - Descriptive statistics, volatility and Bollinger bands
//! - Additive seasonal decomposition of closing prices
//! - Financial news search
//! - Terminal rendering of the dashboard page
//! - Logging and metrics

pub mod analytics;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod http;
pub mod market;
pub mod news;
pub mod session;
pub mod telemetry;
