//! Session loop and show output over in-memory input and output

use crate::support::{dashboard, news_client, not_found_json, yahoo_transport};
use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use rust_decimal_macros::dec;
use std::sync::{Arc, Mutex};
use tickerscope::cli::{run_session, ShowArgs};
use tickerscope::config::Config;
use tickerscope::dashboard::Dashboard;
use tickerscope::http::{CannedTransport, HttpResponse};
use tickerscope::market::{
    Bar, InstrumentInfo, Interval, MarketDataProvider, MarketError, Period, PriceSeries, Ticker,
};
use tickerscope::session::SessionState;

/// Never answers for `SLOW`; answers at once for anything else
#[derive(Default)]
struct StallingProvider {
    requested: Mutex<Vec<String>>,
}

#[async_trait]
impl MarketDataProvider for StallingProvider {
    async fn instrument_info(&self, ticker: &Ticker) -> Result<InstrumentInfo, MarketError> {
        self.requested.lock().unwrap().push(ticker.to_string());
        if ticker.as_str() == "SLOW" {
            return std::future::pending().await;
        }
        Ok(InstrumentInfo {
            long_name: Some(format!("{ticker} Corp.")),
            regular_market_price: Some(dec!(12.50)),
            ..Default::default()
        })
    }

    async fn history(
        &self,
        ticker: &Ticker,
        period: Period,
        interval: Interval,
    ) -> Result<PriceSeries, MarketError> {
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let bars = (0..10)
            .map(|i| {
                let close = 10.0 + i as f64;
                Bar {
                    timestamp: start + Duration::days(i),
                    open: close - 0.5,
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                    volume: 1_000.0,
                }
            })
            .collect();
        Ok(PriceSeries::new(ticker.clone(), period, interval, bars))
    }
}

async fn session_output(provider: Arc<StallingProvider>, input: &'static str) -> String {
    let config = Config::default();
    let dashboard = Dashboard::new(provider, news_client(Arc::new(CannedTransport::new())));
    let state = SessionState::new(Period::SixMonths, Interval::Daily);

    let mut out = Vec::new();
    tokio_test::assert_ok!(run_session(&dashboard, &config, state, input.as_bytes(), &mut out).await);
    String::from_utf8(out).unwrap()
}

#[tokio::test]
async fn test_new_input_supersedes_inflight_run() {
    let provider = Arc::new(StallingProvider::default());
    let output = session_output(provider.clone(), "SLOW\nFAST\n").await;

    assert_eq!(*provider.requested.lock().unwrap(), vec!["SLOW", "FAST"]);
    assert!(!output.contains("Overview: SLOW"));
    assert!(output.contains("== Overview: FAST =="));
    assert!(output.contains("Name: FAST Corp."));
    assert!(output.contains("Current price: $12.50"));
}

#[tokio::test]
async fn test_end_of_input_lets_run_finish() {
    let provider = Arc::new(StallingProvider::default());
    let output = session_output(provider, "4\n").await;

    assert!(output.starts_with("Choose a ticker"));
    assert!(output.contains("4) TSLA"));
    assert!(output.contains("== Overview: TSLA =="));
    assert!(output.contains("== Candlesticks =="));
}

#[tokio::test]
async fn test_commands_without_ticker_do_not_run() {
    let provider = Arc::new(StallingProvider::default());
    let output = session_output(provider.clone(), "refresh\nperiod 1y\nhelp\nquit\nAAPL\n").await;

    assert!(provider.requested.lock().unwrap().is_empty());
    assert!(output.contains("Select a ticker first."));
    assert!(output.contains("[- 1y 1d] > "));
    assert!(output.contains("quit              leave the session"));
    assert!(!output.contains("Overview"));
}

#[tokio::test]
async fn test_show_unknown_symbol_writes_one_line() {
    let market = Arc::new(yahoo_transport(
        HttpResponse {
            status: 404,
            body: not_found_json(),
        },
        HttpResponse::ok(""),
    ));
    let ticker = Ticker::new("ZZZZ").unwrap();
    let result = dashboard(market, Arc::new(CannedTransport::new()))
        .run(&ticker, Period::SixMonths, Interval::Daily)
        .await;

    let args = ShowArgs {
        ticker: "ZZZZ".to_string(),
        period: None,
        interval: None,
        json: false,
    };
    let mut out = Vec::new();
    let succeeded = args
        .write_result(&mut out, &ticker, &result, &Config::default())
        .unwrap();

    assert!(!succeeded);
    assert_eq!(
        String::from_utf8(out).unwrap().trim_end(),
        "Error: no data found for symbol ZZZZ"
    );
}
