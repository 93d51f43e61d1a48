//! Types for market data and the watchlist

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Point-in-time market data for a single coin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinSnapshot {
    /// Provider slug, e.g. "bitcoin"
    pub coin_id: String,

    /// Display name
    pub name: String,

    /// Ticker symbol, uppercased
    pub symbol: String,

    /// Price in USD
    pub price: f64,

    /// Market capitalisation in USD
    pub market_cap: u64,

    /// 24h price change percentage
    pub price_change_24h: f64,

    /// Small logo URL
    pub image: String,
}

/// One row of the top-by-volume listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketListing {
    /// Market cap rank reported by the provider (0 when unranked)
    pub rank: u32,
    pub coin_id: String,
    pub name: String,
    pub symbol: String,
    pub price: f64,
    pub market_cap: u64,
    /// Traded volume over the last 24h in USD
    pub volume_24h: f64,
    pub price_change_24h: f64,
    pub image: String,
}

/// Aggregate market-wide statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalMarketSummary {
    pub total_market_cap: f64,
    pub total_volume_24h: f64,
    /// Market cap change percentage over 24h
    pub market_cap_change_24h: f64,
    pub active_cryptocurrencies: u64,
    pub markets: u64,
    /// Bitcoin share of total market cap, in percent
    pub btc_dominance: f64,
    /// Ether share of total market cap, in percent
    pub eth_dominance: f64,
}

/// Cache introspection report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheDiagnostics {
    /// Keys currently held, sorted, expired ones included
    pub keys: Vec<String>,
    pub size: usize,
    pub ttl_seconds: u64,
}

/// A coin saved by the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct WatchlistEntry {
    pub id: i64,
    pub coin_id: String,
    pub name: String,
    pub symbol: String,
    pub price: f64,
    pub market_cap: i64,
    pub note: String,
    pub created_at: DateTime<Utc>,
}

/// Values for a new watchlist row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewWatchlistEntry {
    pub coin_id: String,
    pub name: String,
    pub symbol: String,
    pub price: f64,
    pub market_cap: i64,
    #[serde(default)]
    pub note: String,
}

impl NewWatchlistEntry {
    /// Builds an insert payload from a fetched snapshot
    pub fn from_snapshot(snapshot: &CoinSnapshot, note: impl Into<String>) -> Self {
        Self {
            coin_id: snapshot.coin_id.clone(),
            name: snapshot.name.clone(),
            symbol: snapshot.symbol.clone(),
            price: snapshot.price,
            market_cap: clamp_market_cap(snapshot.market_cap),
            note: note.into(),
        }
    }
}

/// Converts a provider market cap into the signed column type
pub fn clamp_market_cap(market_cap: u64) -> i64 {
    i64::try_from(market_cap).unwrap_or(i64::MAX)
}
