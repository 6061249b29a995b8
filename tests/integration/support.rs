//! Canned provider payloads shared by the integration tests

use std::sync::Arc;
use tickerscope::dashboard::Dashboard;
use tickerscope::http::{CannedTransport, HttpResponse};
use tickerscope::market::{YahooClient, YahooConfig};
use tickerscope::news::{NewsApiConfig, NewsClient};

pub const YAHOO_BASE: &str = "https://yahoo.test";

/// First bar at 2024-01-02 00:00 UTC
const START_TS: i64 = 1704153600;

/// v8 chart payload with one daily bar per close
pub fn chart_json(closes: &[f64]) -> String {
    let timestamps: Vec<String> = (0..closes.len())
        .map(|i| (START_TS + i as i64 * 86_400).to_string())
        .collect();
    let column = |offset: f64| -> String {
        closes
            .iter()
            .map(|c| format!("{:.4}", c + offset))
            .collect::<Vec<_>>()
            .join(",")
    };
    let volumes: Vec<String> = (0..closes.len())
        .map(|i| (1_000_000 + i * 1_000).to_string())
        .collect();

    format!(
        r#"{{"chart": {{"result": [{{
            "meta": {{"symbol": "AAPL"}},
            "timestamp": [{}],
            "indicators": {{"quote": [{{
                "open": [{}], "high": [{}], "low": [{}], "close": [{}], "volume": [{}]
            }}]}}
        }}], "error": null}}}}"#,
        timestamps.join(","),
        column(-0.5),
        column(1.0),
        column(-1.0),
        column(0.0),
        volumes.join(",")
    )
}

/// Chart payload for a symbol with no bars in range
pub fn empty_chart_json() -> String {
    r#"{"chart": {"result": [{"meta": {"symbol": "AAPL"}, "indicators": {"quote": [{}]}}], "error": null}}"#
        .to_string()
}

/// quoteSummary payload; `price` of `None` leaves the live price out
pub fn summary_json(price: Option<f64>) -> String {
    let price = price
        .map(|p| format!(r#", "regularMarketPrice": {{"raw": {p}, "fmt": "{p}"}}"#))
        .unwrap_or_default();
    format!(
        r#"{{"quoteSummary": {{"result": [{{
            "price": {{
                "longName": "Apple Inc.",
                "exchange": "NMS",
                "marketCap": {{"raw": 2950000000000, "fmt": "2.95T"}}{price}
            }},
            "assetProfile": {{"sector": "Technology"}}
        }}], "error": null}}}}"#
    )
}

pub fn not_found_json() -> String {
    r#"{"quoteSummary": {"result": null, "error": {"code": "Not Found", "description": "Quote not found for symbol: ZZZZ"}}}"#
        .to_string()
}

/// NewsAPI payload with `count` articles, newest first
pub fn news_json(count: usize) -> String {
    let articles: Vec<String> = (0..count)
        .map(|i| {
            format!(
                r#"{{"source": {{"id": null, "name": "Reuters"}}, "title": "Story {i}",
                    "url": "https://www.reuters.com/story-{i}",
                    "publishedAt": "2024-06-2{}T09:00:00Z", "description": "Summary {i}"}}"#,
                9 - i.min(9)
            )
        })
        .collect();
    format!(
        r#"{{"status": "ok", "totalResults": {count}, "articles": [{}]}}"#,
        articles.join(",")
    )
}

/// Yahoo routes for the crumb handshake plus the given metadata and chart bodies
pub fn yahoo_transport(summary: HttpResponse, chart: HttpResponse) -> CannedTransport {
    CannedTransport::new()
        .route("consent.test", HttpResponse::ok(""))
        .route("/v1/test/getcrumb", HttpResponse::ok("crumb-abc"))
        .route("/v10/finance/quoteSummary/", summary)
        .route("/v8/finance/chart/", chart)
}

pub fn yahoo_client(transport: Arc<CannedTransport>) -> YahooClient {
    let config = YahooConfig {
        base_url: YAHOO_BASE.to_string(),
        consent_url: "https://consent.test".to_string(),
        ..Default::default()
    };
    YahooClient::with_transport(config, transport)
}

pub fn news_client(transport: Arc<CannedTransport>) -> NewsClient {
    NewsClient::with_transport(NewsApiConfig::with_api_key("test-key"), transport)
}

/// Dashboard over canned Yahoo and news transports
pub fn dashboard(market: Arc<CannedTransport>, news: Arc<CannedTransport>) -> Dashboard {
    Dashboard::new(Arc::new(yahoo_client(market)), news_client(news))
}
