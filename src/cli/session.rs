//! Session command implementation
//!
//! Reads commands line by line. While a dashboard run is in flight the next
//! input line is awaited too; if it arrives first the run is dropped and the
//! new line handled instead.

use super::{build_dashboard, selectable_period};
use crate::config::Config;
use crate::dashboard::{render_error, render_page, write_page, Dashboard};
use crate::market::{Interval, Period, Ticker};
use crate::session::{SessionCommand, SessionState};
use crate::telemetry::{increment, CounterMetric};
use clap::Args;
use std::io::{self, Write};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

#[derive(Args, Debug)]
pub struct SessionArgs {
    /// Initial history range
    #[arg(short, long)]
    pub period: Option<Period>,

    /// Initial bar size
    #[arg(short, long)]
    pub interval: Option<Interval>,
}

impl SessionArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let dashboard = build_dashboard(config)?;
        let state = SessionState::new(
            selectable_period(self.period.unwrap_or(config.dashboard.default_period))?,
            self.interval.unwrap_or(config.dashboard.default_interval),
        );

        let input = BufReader::new(tokio::io::stdin());
        run_session(&dashboard, config, state, input, &mut io::stdout()).await
    }
}

/// Drive a session over `input` until quit or end of input
pub async fn run_session<R, W>(
    dashboard: &Dashboard,
    config: &Config,
    mut state: SessionState,
    input: R,
    out: &mut W,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let shortlist = config.dashboard.shortlist_tickers();
    tracing::info!(session_id = %state.id, "Session started");

    writeln!(out, "Choose a ticker: type its number or any symbol. 'help' lists commands.")?;
    write_shortlist(out, &shortlist)?;

    let mut lines = input.lines();
    let mut pending: Option<String> = None;
    let mut input_open = true;

    loop {
        let line = match pending.take() {
            Some(line) => line,
            None => {
                write_prompt(out, &state)?;
                match lines.next_line().await? {
                    Some(line) => line,
                    None => break,
                }
            }
        };

        let should_run = match SessionCommand::parse(&line, &shortlist) {
            SessionCommand::Quit => break,
            SessionCommand::Nothing => false,
            SessionCommand::Help => {
                write_help(out)?;
                false
            }
            SessionCommand::Tickers => {
                write_shortlist(out, &shortlist)?;
                false
            }
            SessionCommand::Invalid(message) => {
                writeln!(out, "{message}")?;
                false
            }
            SessionCommand::Select(selection) => state.select(selection),
            SessionCommand::SetPeriod(period) => state.set_period(period) && state.active().is_some(),
            SessionCommand::SetInterval(interval) => {
                state.set_interval(interval) && state.active().is_some()
            }
            SessionCommand::Refresh => {
                if state.active().is_none() {
                    writeln!(out, "Select a ticker first.")?;
                }
                state.active().is_some()
            }
        };

        let Some(ticker) = state.active().cloned().filter(|_| should_run) else {
            continue;
        };

        let run = dashboard.run(&ticker, state.period(), state.interval());
        tokio::pin!(run);

        // End of input lets the last run finish
        let result = loop {
            tokio::select! {
                biased;
                result = &mut run => break Some(result),
                next = lines.next_line(), if input_open => match next? {
                    Some(line) => {
                        increment(CounterMetric::RunCancelled);
                        tracing::info!(session_id = %state.id, ticker = %ticker, "Run superseded by new input");
                        pending = Some(line);
                        break None;
                    }
                    None => input_open = false,
                },
            }
        };

        if let Some(result) = result {
            let page = match result {
                Ok(report) => render_page(
                    &report,
                    config.dashboard.chart_width,
                    config.dashboard.chart_height,
                ),
                Err(e) => render_error(&e),
            };
            write_page(out, &page)?;
            out.flush()?;
        }
    }

    tracing::info!(session_id = %state.id, "Session ended");
    Ok(())
}

fn write_prompt<W: Write>(out: &mut W, state: &SessionState) -> io::Result<()> {
    let active = state.active().map(Ticker::as_str).unwrap_or("-");
    write!(out, "[{active} {} {}] > ", state.period(), state.interval())?;
    out.flush()
}

fn write_shortlist<W: Write>(out: &mut W, shortlist: &[Ticker]) -> io::Result<()> {
    let entries: Vec<String> = shortlist
        .iter()
        .enumerate()
        .map(|(i, ticker)| format!("{}) {ticker}", i + 1))
        .collect();
    writeln!(out, "{}", entries.join("  "))
}

fn write_help<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "  <number>          pick from the shortlist")?;
    writeln!(out, "  <symbol>          any ticker symbol")?;
    writeln!(out, "  period <p>        1mo, 3mo, 6mo, 1y, 5y, max")?;
    writeln!(out, "  interval <i>      1d, 1wk, 1mo")?;
    writeln!(out, "  refresh           reload the current ticker")?;
    writeln!(out, "  tickers           show the shortlist")?;
    writeln!(out, "  quit              leave the session")
}
