//! Market data client
//!
//! Wraps a [`MarketDataProvider`] with a [`ResponseCache`]. This is the only
//! entry point the web layer uses for market data.

use crate::{
    cache::{CachedPayload, ResponseCache},
    constants::{DEFAULT_TOP_LIMIT, GLOBAL_CACHE_KEY, TOP_VOLUME_CACHE_PREFIX},
    error::MarketDataError,
    metrics::{MetricsCollector, ProviderMetrics},
    provider::MarketDataProvider,
    types::{CacheDiagnostics, CoinSnapshot, GlobalMarketSummary, MarketListing},
};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

/// Cached access to market data
///
/// Concurrent callers missing on the same key each go to the provider; the
/// last response to arrive is what stays cached.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use coin_watchlist::{cache::ResponseCache, providers::CoinGeckoProvider, MarketDataClient};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = Arc::new(CoinGeckoProvider::new(None)?);
/// let client = MarketDataClient::new(provider, Arc::new(ResponseCache::new()));
/// let btc = client.fetch_coin("bitcoin").await?;
/// println!("{}: ${:.2}", btc.symbol, btc.price);
/// # Ok(())
/// # }
/// ```
pub struct MarketDataClient {
    provider: Arc<dyn MarketDataProvider>,
    cache: Arc<ResponseCache>,
    metrics: MetricsCollector,
}

impl MarketDataClient {
    pub fn new(provider: Arc<dyn MarketDataProvider>, cache: Arc<ResponseCache>) -> Self {
        let metrics = MetricsCollector::new(provider.provider_name());
        Self {
            provider,
            cache,
            metrics,
        }
    }

    /// Fetches a single coin, serving from cache while fresh
    ///
    /// # Arguments
    /// * `coin_id` - Provider slug; callers trim and lowercase user input
    pub async fn fetch_coin(&self, coin_id: &str) -> Result<CoinSnapshot, MarketDataError> {
        if coin_id.is_empty() {
            return Err(MarketDataError::NotFound(String::new()));
        }

        if let Some(CachedPayload::Coin(snapshot)) = self.cached(coin_id).await {
            return Ok(snapshot);
        }

        let snapshot = self
            .timed(coin_id, self.provider.fetch_coin(coin_id))
            .await?;
        self.cache
            .insert(coin_id, CachedPayload::Coin(snapshot.clone()))
            .await;
        Ok(snapshot)
    }

    /// Fetches the top `limit` coins by 24h volume; a zero limit means the default
    pub async fn fetch_top_by_volume(
        &self,
        limit: u32,
    ) -> Result<Vec<MarketListing>, MarketDataError> {
        let limit = if limit == 0 { DEFAULT_TOP_LIMIT } else { limit };
        let key = top_volume_key(limit);

        if let Some(CachedPayload::TopVolume(listings)) = self.cached(&key).await {
            return Ok(listings);
        }

        let listings = self
            .timed(&key, self.provider.fetch_top_by_volume(limit))
            .await?;
        self.cache
            .insert(key, CachedPayload::TopVolume(listings.clone()))
            .await;
        Ok(listings)
    }

    /// Fetches market-wide aggregates
    pub async fn fetch_global_summary(&self) -> Result<GlobalMarketSummary, MarketDataError> {
        if let Some(CachedPayload::Global(summary)) = self.cached(GLOBAL_CACHE_KEY).await {
            return Ok(summary);
        }

        let summary = self
            .timed(GLOBAL_CACHE_KEY, self.provider.fetch_global_summary())
            .await?;
        self.cache
            .insert(GLOBAL_CACHE_KEY, CachedPayload::Global(summary.clone()))
            .await;
        Ok(summary)
    }

    /// Forgets everything cached so the next fetch of any key goes upstream
    pub async fn invalidate_all(&self) {
        self.cache.clear().await;
        tracing::info!("Market data cache invalidated");
    }

    pub async fn cache_diagnostics(&self) -> CacheDiagnostics {
        self.cache.diagnostics().await
    }

    pub fn provider_metrics(&self) -> ProviderMetrics {
        self.metrics.snapshot()
    }

    async fn cached(&self, key: &str) -> Option<CachedPayload> {
        match self.cache.get(key).await {
            Some(payload) => {
                tracing::debug!(key, "Cache hit");
                self.metrics.record_cache_hit();
                Some(payload)
            }
            None => {
                tracing::debug!(key, "Cache miss");
                self.metrics.record_cache_miss();
                None
            }
        }
    }

    /// Awaits a provider call, recording latency and logging failures
    async fn timed<T>(
        &self,
        key: &str,
        call: impl Future<Output = Result<T, MarketDataError>>,
    ) -> Result<T, MarketDataError> {
        let start = Instant::now();
        let result = call.await;
        let elapsed = start.elapsed();
        self.metrics.record_request(elapsed, result.is_ok());

        match &result {
            Ok(_) => tracing::debug!(
                key,
                provider = self.provider.provider_name(),
                latency_ms = elapsed.as_millis() as u64,
                "Fetched market data"
            ),
            Err(e) => tracing::warn!(
                key,
                provider = self.provider.provider_name(),
                error = %e,
                "Failed to fetch market data"
            ),
        }

        result
    }
}

/// Cache key for a top-by-volume page of `limit` entries
pub fn top_volume_key(limit: u32) -> String {
    format!("{TOP_VOLUME_CACHE_PREFIX}{limit}")
}
