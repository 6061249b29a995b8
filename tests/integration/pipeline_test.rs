//! End-to-end dashboard runs over canned provider responses

use crate::support::{
    chart_json, dashboard, empty_chart_json, news_json, not_found_json, summary_json,
    yahoo_client, yahoo_transport,
};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;
use tickerscope::dashboard::{
    render_error, render_page, Block, DecompositionSection, HistorySection,
};
use tickerscope::http::{CannedTransport, HttpResponse};
use tickerscope::market::{CachedProvider, Interval, MarketDataProvider, MarketError, Period, Ticker};

fn aapl() -> Ticker {
    Ticker::new("AAPL").unwrap()
}

/// 130 daily closes rising by one from 100.00 to 229.00
fn rising_closes() -> Vec<f64> {
    (0..130).map(|i| 100.0 + i as f64).collect()
}

#[tokio::test]
async fn test_full_dashboard_for_130_bars() {
    let market = Arc::new(yahoo_transport(
        HttpResponse::ok(summary_json(Some(187.44))),
        HttpResponse::ok(chart_json(&rising_closes())),
    ));
    let news = Arc::new(CannedTransport::new().route("newsapi", HttpResponse::ok(news_json(5))));
    let dashboard = dashboard(market.clone(), news.clone());

    let report = tokio_test::assert_ok!(
        dashboard
            .run(&aapl(), Period::SixMonths, Interval::Daily)
            .await
    );

    assert_eq!(report.info.long_name.as_deref(), Some("Apple Inc."));
    assert_eq!(report.info.sector.as_deref(), Some("Technology"));
    assert_eq!(report.current_price, Some(dec!(187.44)));

    let HistorySection::Ready(history) = &report.history else {
        panic!("expected history");
    };
    assert_eq!(history.series.len(), 130);

    let metrics = &history.metrics;
    assert!((metrics.percent_change.unwrap() - 129.0).abs() < 1e-9);
    assert!((metrics.mean_close - 164.5).abs() < 1e-9);
    assert!((metrics.median_close - 164.5).abs() < 1e-9);
    assert_eq!(metrics.max_close, 229.0);
    assert_eq!(metrics.min_close, 100.0);
    assert!(metrics.max_volume >= metrics.mean_volume && metrics.mean_volume >= metrics.min_volume);

    assert_eq!(history.bollinger.len(), 130);
    assert_eq!(history.bollinger.defined(), 111);
    assert!(history.bollinger.mid[18].is_none());

    let DecompositionSection::Ready(decomposition) = &history.decomposition else {
        panic!("expected decomposition");
    };
    assert_eq!(decomposition.len(), 130);
    assert_eq!(decomposition.timestamps.len(), 130);
    assert_eq!(decomposition.trend.iter().filter(|t| t.is_some()).count(), 100);
    for i in 0..130 {
        if let (Some(t), Some(r)) = (decomposition.trend[i], decomposition.residual[i]) {
            let rebuilt = t + decomposition.seasonal[i] + r;
            assert!((decomposition.observed[i] - rebuilt).abs() < 1e-9);
        }
    }

    let titles: Vec<&str> = history.news.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, vec!["Story 0", "Story 1", "Story 2"]);

    // Live price present: only the requested history range is fetched
    let chart_requests: Vec<_> = market
        .requests()
        .into_iter()
        .filter(|r| r.url.contains("/v8/finance/chart/AAPL"))
        .collect();
    assert_eq!(chart_requests.len(), 1);
    assert_eq!(chart_requests[0].query_value("range"), Some("6mo"));
    assert_eq!(chart_requests[0].query_value("interval"), Some("1d"));
    assert_eq!(news.requests()[0].query_value("q"), Some("AAPL"));
}

#[tokio::test]
async fn test_rendered_page_for_130_bars() {
    let market = Arc::new(yahoo_transport(
        HttpResponse::ok(summary_json(Some(187.44))),
        HttpResponse::ok(chart_json(&rising_closes())),
    ));
    let news = Arc::new(CannedTransport::new().route("newsapi", HttpResponse::ok(news_json(0))));
    let report = dashboard(market, news)
        .run(&aapl(), Period::SixMonths, Interval::Daily)
        .await
        .unwrap();

    let page = render_page(&report, 100, 24);
    let overview = page.section("Overview").unwrap().texts();
    assert!(overview.contains(&"Market cap: 2950.00 bn USD"));
    assert!(overview.contains(&"Current price: $187.44"));

    let Block::Table(rows) = &page.section("Key metrics").unwrap().blocks[0] else {
        panic!("expected metrics table");
    };
    assert_eq!(rows[4], ("Change, start to end (%)".to_string(), "129.00".to_string()));
    assert_eq!(rows[2].1, "229.00");

    let news = page.section("Financial news").unwrap().texts();
    assert_eq!(news.last(), Some(&"No news available."));

    let decomposition = page.section("Time series decomposition").unwrap();
    let charts = decomposition
        .blocks
        .iter()
        .filter(|b| matches!(b, Block::Chart(_)))
        .count();
    assert_eq!(charts, 4);
}

#[tokio::test]
async fn test_empty_history_skips_dependent_sections() {
    let market = Arc::new(yahoo_transport(
        HttpResponse::ok(summary_json(Some(10.0))),
        HttpResponse::ok(empty_chart_json()),
    ));
    let news = Arc::new(CannedTransport::new().route("newsapi", HttpResponse::ok(news_json(3))));
    let report = dashboard(market, news.clone())
        .run(&aapl(), Period::OneMonth, Interval::Daily)
        .await
        .unwrap();

    assert!(matches!(report.history, HistorySection::Empty));
    assert!(news.requests().is_empty());

    let page = render_page(&report, 80, 20);
    assert_eq!(page.sections.len(), 2);
    assert_eq!(page.sections[1].texts(), vec!["No data to display."]);
}

#[tokio::test]
async fn test_unknown_symbol_is_single_error() {
    let market = Arc::new(yahoo_transport(
        HttpResponse {
            status: 404,
            body: not_found_json(),
        },
        HttpResponse::ok(empty_chart_json()),
    ));
    let news = Arc::new(CannedTransport::new());
    let result = dashboard(market.clone(), news.clone())
        .run(&Ticker::new("zzzz").unwrap(), Period::SixMonths, Interval::Daily)
        .await;

    let err = tokio_test::assert_err!(result);
    let page = render_error(&err);
    assert_eq!(page.sections.len(), 1);
    assert_eq!(page.sections[0].texts(), vec!["Error: no data found for symbol ZZZZ"]);

    assert!(market.requests().iter().all(|r| !r.url.contains("/v8/finance/chart/")));
    assert!(news.requests().is_empty());
}

#[tokio::test]
async fn test_history_transport_failure_aborts() {
    let market = Arc::new(
        CannedTransport::new()
            .route("consent.test", HttpResponse::ok(""))
            .route("/v1/test/getcrumb", HttpResponse::ok("crumb-abc"))
            .route("/v10/finance/quoteSummary/", HttpResponse::ok(summary_json(Some(5.0))))
            .fail("/v8/finance/chart/", "operation timed out"),
    );
    let result = dashboard(market, Arc::new(CannedTransport::new()))
        .run(&aapl(), Period::SixMonths, Interval::Daily)
        .await;

    let err = result.unwrap_err();
    assert!(err.to_string().contains("operation timed out"));
}

#[tokio::test]
async fn test_price_fallback_uses_latest_close() {
    let market = Arc::new(yahoo_transport(
        HttpResponse::ok(summary_json(None)),
        HttpResponse::ok(chart_json(&[101.5, 102.25, 103.75])),
    ));
    let report = dashboard(market.clone(), Arc::new(CannedTransport::new()))
        .run(&aapl(), Period::ThreeMonths, Interval::Weekly)
        .await
        .unwrap();

    assert_eq!(report.current_price, Decimal::from_f64(103.75));

    let ranges: Vec<String> = market
        .requests()
        .iter()
        .filter(|r| r.url.contains("/v8/finance/chart/"))
        .filter_map(|r| r.query_value("range").map(str::to_string))
        .collect();
    assert_eq!(ranges, vec!["1d", "3mo"]);
}

#[tokio::test]
async fn test_short_history_warns_about_decomposition() {
    let closes: Vec<f64> = (0..40).map(|i| 50.0 + (i % 5) as f64).collect();
    let market = Arc::new(yahoo_transport(
        HttpResponse::ok(summary_json(Some(50.0))),
        HttpResponse::ok(chart_json(&closes)),
    ));
    let report = dashboard(market, Arc::new(CannedTransport::new()))
        .run(&aapl(), Period::OneMonth, Interval::Daily)
        .await
        .unwrap();

    let HistorySection::Ready(history) = &report.history else {
        panic!("expected history");
    };
    assert!(matches!(
        history.decomposition,
        DecompositionSection::Insufficient {
            available: 40,
            required: 60
        }
    ));

    // Every other section is still present
    let page = render_page(&report, 80, 20);
    assert!(page.section("Key metrics").is_some());
    assert!(page.section("Bollinger bands").is_some());
    assert!(page.section("Financial news").is_some());
}

#[tokio::test]
async fn test_report_serializes_to_json() {
    let market = Arc::new(yahoo_transport(
        HttpResponse::ok(summary_json(Some(187.44))),
        HttpResponse::ok(chart_json(&rising_closes())),
    ));
    let report = dashboard(market, Arc::new(CannedTransport::new()))
        .run(&aapl(), Period::SixMonths, Interval::Daily)
        .await
        .unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["ticker"], "AAPL");
    assert_eq!(json["period"], "6mo");
    assert_eq!(json["history"]["status"], "ready");
    assert_eq!(json["history"]["decomposition"]["status"], "ready");
    assert!(json["history"]["bollinger"]["mid"][0].is_null());
}

#[tokio::test]
async fn test_cache_serves_repeat_runs() {
    let market = Arc::new(yahoo_transport(
        HttpResponse::ok(summary_json(Some(187.44))),
        HttpResponse::ok(chart_json(&rising_closes())),
    ));
    let provider = CachedProvider::new(yahoo_client(market.clone()), Duration::from_secs(60));

    for _ in 0..3 {
        provider.instrument_info(&aapl()).await.unwrap();
        provider
            .history(&aapl(), Period::SixMonths, Interval::Daily)
            .await
            .unwrap();
    }

    let count = |fragment: &str| {
        market
            .requests()
            .iter()
            .filter(|r| r.url.contains(fragment))
            .count()
    };
    assert_eq!(count("/v10/finance/quoteSummary/"), 1);
    assert_eq!(count("/v8/finance/chart/"), 1);
    assert_eq!(provider.entry_count().await, 2);
}

#[tokio::test]
async fn test_provider_error_payload() {
    let market = Arc::new(yahoo_transport(
        HttpResponse::ok(summary_json(Some(1.0))),
        HttpResponse {
            status: 400,
            body: r#"{"chart": {"result": null, "error": {"code": "Bad Request", "description": "Invalid input - interval=1wk is not supported"}}}"#.to_string(),
        },
    ));
    let client = yahoo_client(market);
    let result = client.history(&aapl(), Period::Max, Interval::Weekly).await;
    assert!(matches!(result, Err(MarketError::Provider(_))));
}
