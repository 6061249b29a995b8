//! Short-lived response cache in front of a market data provider

use super::{InstrumentInfo, Interval, MarketDataProvider, MarketError, Period, PriceSeries, Ticker};
use crate::telemetry::{increment, CounterMetric};
use async_trait::async_trait;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

type HistoryKey = (Ticker, Period, Interval);

#[derive(Debug, Clone)]
struct Entry<T> {
    value: T,
    expires_at: Instant,
}

#[derive(Debug)]
struct TtlMap<K, V> {
    entries: RwLock<HashMap<K, Entry<V>>>,
}

impl<K: Eq + Hash, V: Clone> TtlMap<K, V> {
    fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    async fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| Instant::now() < entry.expires_at)
            .map(|entry| entry.value.clone())
    }

    async fn put(&self, key: K, value: V, ttl: Duration) {
        let mut entries = self.entries.write().await;
        let now = Instant::now();
        entries.retain(|_, entry| entry.expires_at > now);
        entries.insert(
            key,
            Entry {
                value,
                expires_at: now + ttl,
            },
        );
    }

    async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

/// Caches metadata per ticker and history per (ticker, period, interval)
///
/// Only successful responses are cached. A zero TTL disables caching.
pub struct CachedProvider<P> {
    inner: P,
    ttl: Duration,
    info: TtlMap<Ticker, InstrumentInfo>,
    history: TtlMap<HistoryKey, PriceSeries>,
}

impl<P: MarketDataProvider> CachedProvider<P> {
    /// Wrap `inner`, keeping responses for `ttl`
    pub fn new(inner: P, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            info: TtlMap::new(),
            history: TtlMap::new(),
        }
    }

    /// Number of live and expired entries currently held
    pub async fn entry_count(&self) -> usize {
        self.info.len().await + self.history.len().await
    }

    fn enabled(&self) -> bool {
        !self.ttl.is_zero()
    }
}

#[async_trait]
impl<P: MarketDataProvider> MarketDataProvider for CachedProvider<P> {
    async fn instrument_info(&self, ticker: &Ticker) -> Result<InstrumentInfo, MarketError> {
        if !self.enabled() {
            return self.inner.instrument_info(ticker).await;
        }

        if let Some(info) = self.info.get(ticker).await {
            increment(CounterMetric::CacheHit);
            tracing::debug!(ticker = %ticker, "Instrument info served from cache");
            return Ok(info);
        }

        increment(CounterMetric::CacheMiss);
        let info = self.inner.instrument_info(ticker).await?;
        self.info.put(ticker.clone(), info.clone(), self.ttl).await;
        Ok(info)
    }

    async fn history(
        &self,
        ticker: &Ticker,
        period: Period,
        interval: Interval,
    ) -> Result<PriceSeries, MarketError> {
        if !self.enabled() {
            return self.inner.history(ticker, period, interval).await;
        }

        let key = (ticker.clone(), period, interval);
        if let Some(series) = self.history.get(&key).await {
            increment(CounterMetric::CacheHit);
            tracing::debug!(
                ticker = %ticker,
                period = %period,
                interval = %interval,
                "Price history served from cache"
            );
            return Ok(series);
        }

        increment(CounterMetric::CacheMiss);
        let series = self.inner.history(ticker, period, interval).await?;
        self.history.put(key, series.clone(), self.ttl).await;
        Ok(series)
    }
}
