//! Prometheus metrics

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;

/// Latency metric types
#[derive(Debug, Clone, Copy)]
pub enum LatencyMetric {
    /// Instrument metadata fetch
    InstrumentInfo,
    /// Price history fetch
    History,
    /// News search
    News,
    /// Whole dashboard run
    Pipeline,
}

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    /// Market data served from cache
    CacheHit,
    /// Market data fetched from the provider
    CacheMiss,
    /// Dashboard run aborted by a market data error
    FetchFailure,
    /// News search failed at the transport level
    NewsFailure,
    /// In-flight run dropped because the selection changed
    RunCancelled,
}

/// Record a latency measurement
pub fn record_latency(metric: LatencyMetric, duration: Duration) {
    let metric_name = match metric {
        LatencyMetric::InstrumentInfo => "tickerscope_instrument_info_latency_ms",
        LatencyMetric::History => "tickerscope_history_latency_ms",
        LatencyMetric::News => "tickerscope_news_latency_ms",
        LatencyMetric::Pipeline => "tickerscope_pipeline_latency_ms",
    };

    let value_ms = duration.as_secs_f64() * 1000.0;
    metrics::histogram!(metric_name).record(value_ms);
    tracing::debug!(metric = metric_name, value_ms, "Recording latency");
}

/// Increment a counter by one
pub fn increment(metric: CounterMetric) {
    let metric_name = match metric {
        CounterMetric::CacheHit => "tickerscope_cache_hits_total",
        CounterMetric::CacheMiss => "tickerscope_cache_misses_total",
        CounterMetric::FetchFailure => "tickerscope_fetch_failures_total",
        CounterMetric::NewsFailure => "tickerscope_news_failures_total",
        CounterMetric::RunCancelled => "tickerscope_runs_cancelled_total",
    };

    metrics::counter!(metric_name).increment(1);
}

/// Serve metrics for Prometheus scraping on `port`
pub fn init_metrics_exporter(port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to start metrics exporter: {}", e))?;

    tracing::info!(%addr, "Metrics exporter listening");
    Ok(())
}
