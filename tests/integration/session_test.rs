//! Integration tests for ticker selection

use tickerscope::config::Config;
use tickerscope::market::{Interval, Period};
use tickerscope::session::{Selection, SessionCommand, SessionState};

fn apply(state: &mut SessionState, line: &str, config: &Config) -> bool {
    let shortlist = config.dashboard.shortlist_tickers();
    match SessionCommand::parse(line, &shortlist) {
        SessionCommand::Select(selection) => state.select(selection),
        SessionCommand::SetPeriod(period) => state.set_period(period),
        SessionCommand::SetInterval(interval) => state.set_interval(interval),
        _ => false,
    }
}

#[test]
fn test_shortlist_click_then_free_text() {
    let config = Config::default();
    let mut state = SessionState::new(
        config.dashboard.default_period,
        config.dashboard.default_interval,
    );

    assert!(apply(&mut state, "4", &config));
    assert_eq!(state.active().unwrap().as_str(), "TSLA");

    assert!(apply(&mut state, "nvda", &config));
    assert_eq!(state.active().unwrap().as_str(), "NVDA");

    assert!(apply(&mut state, "1", &config));
    assert_eq!(state.active().unwrap().as_str(), "AAPL");
}

#[test]
fn test_selectors_keep_active_ticker() {
    let config = Config::default();
    let mut state = SessionState::new(Period::SixMonths, Interval::Daily);

    apply(&mut state, "QCOM", &config);
    assert!(apply(&mut state, "period 5y", &config));
    assert!(apply(&mut state, "interval 1mo", &config));

    assert_eq!(state.active().unwrap().as_str(), "QCOM");
    assert_eq!(state.period(), Period::FiveYears);
    assert_eq!(state.interval(), Interval::Monthly);
}

#[test]
fn test_custom_shortlist_indices() {
    let mut config = Config::default();
    config.dashboard.shortlist = vec!["spy".to_string(), "qqq".to_string()];
    let shortlist = config.dashboard.shortlist_tickers();

    assert!(matches!(
        SessionCommand::parse("2", &shortlist),
        SessionCommand::Select(Selection::Shortlist(t)) if t.as_str() == "QQQ"
    ));
    assert!(matches!(
        SessionCommand::parse("3", &shortlist),
        SessionCommand::Invalid(_)
    ));
}
