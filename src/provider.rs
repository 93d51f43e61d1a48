//! Provider abstraction for fetching market data from external APIs

use crate::{
    error::MarketDataError,
    types::{CoinSnapshot, GlobalMarketSummary, MarketListing},
};
use async_trait::async_trait;

/// Trait for market data providers
///
/// Implementations perform exactly one outbound request per call and never
/// cache; caching is the client's job.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetches detail data for a single coin
    ///
    /// # Arguments
    /// * `coin_id` - Provider slug, already trimmed and lowercased
    async fn fetch_coin(&self, coin_id: &str) -> Result<CoinSnapshot, MarketDataError>;

    /// Fetches the first page of listings ordered by descending 24h volume
    async fn fetch_top_by_volume(&self, limit: u32) -> Result<Vec<MarketListing>, MarketDataError>;

    /// Fetches market-wide aggregates
    async fn fetch_global_summary(&self) -> Result<GlobalMarketSummary, MarketDataError>;

    /// Returns the name of this provider
    fn provider_name(&self) -> &'static str;
}
