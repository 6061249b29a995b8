//! Ticker selection and session state
//!
//! A session holds exactly one active ticker plus the period and interval
//! selectors. Every selection overwrites the active ticker; the most recent
//! input wins regardless of where it came from.

use crate::market::{Interval, Period, Ticker};
use uuid::Uuid;

/// Default quick-pick tickers
pub const SHORTLIST: [&str; 8] = ["AAPL", "MSFT", "AMZN", "TSLA", "ASML", "NVDA", "QCOM", "QUBT"];

/// A user's choice of ticker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Click on a shortlist entry
    Shortlist(Ticker),
    /// Free-text entry, not validated against the provider
    FreeText(String),
}

/// Per-session selector state
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Identifier attached to this session's log lines
    pub id: Uuid,
    active: Option<Ticker>,
    period: Period,
    interval: Interval,
}

impl SessionState {
    /// New session with no active ticker
    pub fn new(period: Period, interval: Interval) -> Self {
        Self {
            id: Uuid::new_v4(),
            active: None,
            period,
            interval,
        }
    }

    pub fn active(&self) -> Option<&Ticker> {
        self.active.as_ref()
    }

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn interval(&self) -> Interval {
        self.interval
    }

    /// Apply a selection; returns true when the active ticker is now set from it
    ///
    /// Blank free text leaves the state untouched.
    pub fn select(&mut self, selection: Selection) -> bool {
        let ticker = match selection {
            Selection::Shortlist(ticker) => ticker,
            Selection::FreeText(text) => match Ticker::new(&text) {
                Some(ticker) => ticker,
                None => return false,
            },
        };

        tracing::debug!(session_id = %self.id, ticker = %ticker, "Active ticker selected");
        self.active = Some(ticker);
        true
    }

    /// Change the period; returns true if it changed
    pub fn set_period(&mut self, period: Period) -> bool {
        let changed = self.period != period;
        self.period = period;
        changed
    }

    /// Change the interval; returns true if it changed
    pub fn set_interval(&mut self, interval: Interval) -> bool {
        let changed = self.interval != interval;
        self.interval = interval;
        changed
    }
}

/// A line of user input, interpreted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Select(Selection),
    SetPeriod(Period),
    SetInterval(Interval),
    /// Re-run the dashboard for the current selection
    Refresh,
    Tickers,
    Help,
    Quit,
    /// Blank line
    Nothing,
    /// Recognized keyword with a bad argument
    Invalid(String),
}

impl SessionCommand {
    /// Interpret an input line against the shortlist
    ///
    /// A number `1..=N` picks the N-th shortlist entry; unrecognized input is
    /// free text.
    pub fn parse(line: &str, shortlist: &[Ticker]) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return SessionCommand::Nothing;
        }

        let mut words = line.split_whitespace();
        let head = words.next().unwrap_or_default().to_ascii_lowercase();
        let arg = words.next();

        match (head.as_str(), arg) {
            ("quit" | "exit" | "q", None) => SessionCommand::Quit,
            ("help" | "?", None) => SessionCommand::Help,
            ("tickers", None) => SessionCommand::Tickers,
            ("refresh" | "r", None) => SessionCommand::Refresh,
            ("period", Some(value)) => match value.parse::<Period>() {
                Ok(period) if Period::SELECTABLE.contains(&period) => SessionCommand::SetPeriod(period),
                Ok(_) => SessionCommand::Invalid(format!("unsupported period '{value}'")),
                Err(e) => SessionCommand::Invalid(e.to_string()),
            },
            ("interval", Some(value)) => match value.parse::<Interval>() {
                Ok(interval) => SessionCommand::SetInterval(interval),
                Err(e) => SessionCommand::Invalid(e.to_string()),
            },
            ("period" | "interval", None) => {
                SessionCommand::Invalid(format!("'{head}' needs a value"))
            }
            _ => match line.parse::<usize>() {
                Ok(n) if (1..=shortlist.len()).contains(&n) => {
                    SessionCommand::Select(Selection::Shortlist(shortlist[n - 1].clone()))
                }
                Ok(n) => SessionCommand::Invalid(format!(
                    "no shortlist entry {n} (choose 1-{})",
                    shortlist.len()
                )),
                Err(_) => SessionCommand::Select(Selection::FreeText(line.to_string())),
            },
        }
    }
}
