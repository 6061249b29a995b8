//! Show command implementation

use super::{build_dashboard, selectable_period};
use crate::config::Config;
use crate::dashboard::{render_error, render_page, write_page, DashboardReport, PipelineError};
use crate::market::{Interval, Period, Ticker};
use anyhow::Context;
use clap::Args;
use std::io::{self, Write};
use std::process::ExitCode;

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Ticker symbol, e.g. AAPL
    pub ticker: String,

    /// History range: 1mo, 3mo, 6mo, 1y, 5y or max
    #[arg(short, long)]
    pub period: Option<Period>,

    /// Bar size: 1d, 1wk or 1mo
    #[arg(short, long)]
    pub interval: Option<Interval>,

    /// Print the report as JSON instead of drawing it
    #[arg(long)]
    pub json: bool,
}

impl ShowArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<ExitCode> {
        let ticker = Ticker::new(&self.ticker).context("ticker must not be blank")?;
        let period = selectable_period(self.period.unwrap_or(config.dashboard.default_period))?;
        let interval = self.interval.unwrap_or(config.dashboard.default_interval);

        let dashboard = build_dashboard(config)?;
        let result = dashboard.run(&ticker, period, interval).await;

        let stdout = io::stdout();
        let mut out = stdout.lock();
        let succeeded = self.write_result(&mut out, &ticker, &result, config)?;
        out.flush()?;
        Ok(if succeeded {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        })
    }

    /// Write a finished run to `out`
    ///
    /// A failed run is a single error line, or a one-line JSON object with
    /// `--json`. Returns whether the run succeeded.
    pub fn write_result<W: Write>(
        &self,
        out: &mut W,
        ticker: &Ticker,
        result: &Result<DashboardReport, PipelineError>,
        config: &Config,
    ) -> anyhow::Result<bool> {
        match result {
            Ok(report) if self.json => {
                writeln!(out, "{}", serde_json::to_string_pretty(report)?)?;
            }
            Ok(report) => {
                let page = render_page(
                    report,
                    config.dashboard.chart_width,
                    config.dashboard.chart_height,
                );
                write_page(out, &page)?;
            }
            Err(e) => {
                if self.json {
                    let body = serde_json::json!({ "ticker": ticker, "error": e.to_string() });
                    writeln!(out, "{body}")?;
                } else {
                    write_page(out, &render_error(e))?;
                }
                return Ok(false);
            }
        }
        Ok(true)
    }
}
