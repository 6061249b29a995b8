//! Integration tests for the news search client

use crate::support::{news_client, news_json};
use std::sync::Arc;
use tickerscope::http::{CannedTransport, HttpResponse};
use tickerscope::market::Ticker;
use tickerscope::news::NewsError;

async fn fetch_with(response: HttpResponse) -> Result<Vec<tickerscope::news::NewsArticle>, NewsError> {
    let transport = Arc::new(CannedTransport::new().route("newsapi.org", response));
    news_client(transport)
        .fetch(&Ticker::new("MSFT").unwrap())
        .await
}

#[tokio::test]
async fn test_result_count_is_capped_at_three() {
    for (available, expected) in [(0, 0), (1, 1), (5, 3)] {
        let articles = fetch_with(HttpResponse::ok(news_json(available)))
            .await
            .unwrap();
        assert_eq!(articles.len(), expected, "{available} available");
    }
}

#[tokio::test]
async fn test_articles_keep_provider_order() {
    let articles = fetch_with(HttpResponse::ok(news_json(4))).await.unwrap();
    let dates: Vec<_> = articles.iter().map(|a| a.published_at.unwrap()).collect();
    assert!(dates.windows(2).all(|pair| pair[0] >= pair[1]));
    assert_eq!(articles[0].source, "Reuters");
    assert_eq!(articles[0].url, "https://www.reuters.com/story-0");
}

#[tokio::test]
async fn test_not_found_yields_no_articles() {
    let articles = fetch_with(HttpResponse::status(404)).await.unwrap();
    assert!(articles.is_empty());
}

#[tokio::test]
async fn test_rate_limited_yields_no_articles() {
    let articles = fetch_with(HttpResponse {
        status: 429,
        body: r#"{"status": "error", "code": "rateLimited"}"#.to_string(),
    })
    .await
    .unwrap();
    assert!(articles.is_empty());
}

#[tokio::test]
async fn test_transport_failure_is_error() {
    let transport = Arc::new(CannedTransport::new().fail("newsapi.org", "dns error"));
    let result = news_client(transport)
        .fetch(&Ticker::new("MSFT").unwrap())
        .await;
    assert!(matches!(result, Err(NewsError::Transport(_))));
}
