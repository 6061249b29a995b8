//! CLI interface for tickerscope
//!
//! Provides subcommands for:
//! - `show`: Render the dashboard for one ticker
//! - `session`: Interactive ticker selection loop
//! - `tickers`: List the quick-pick shortlist
//! - `config`: Show the effective configuration

mod session;
mod show;

pub use session::{run_session, SessionArgs};
pub use show::ShowArgs;

use crate::config::Config;
use crate::dashboard::Dashboard;
use crate::market::{CachedProvider, Period, YahooClient};
use crate::news::NewsClient;
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "tickerscope")]
#[command(about = "Terminal stock dashboard: prices, statistics, charts and news")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "tickerscope.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render the dashboard for one ticker
    Show(ShowArgs),
    /// Pick tickers interactively
    Session(SessionArgs),
    /// List the quick-pick tickers
    Tickers,
    /// Show configuration
    Config,
}

/// Build the dashboard from configuration
///
/// The news API key is resolved first so a missing key fails before any fetch.
pub fn build_dashboard(config: &Config) -> anyhow::Result<Dashboard> {
    let api_key = config.news_api_key()?;

    let yahoo = YahooClient::new(config.market.yahoo()).context("failed to create market data client")?;
    let market = Arc::new(CachedProvider::new(yahoo, config.cache.ttl()));
    let news = NewsClient::new(config.news.client_config(api_key))
        .context("failed to create news client")?;

    Ok(Dashboard::new(market, news))
}

/// Reject periods the selector does not offer
fn selectable_period(period: Period) -> anyhow::Result<Period> {
    if Period::SELECTABLE.contains(&period) {
        Ok(period)
    } else {
        anyhow::bail!("unsupported period '{period}', expected one of: 1mo, 3mo, 6mo, 1y, 5y, max")
    }
}
