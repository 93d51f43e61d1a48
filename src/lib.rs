//! # Coin Watchlist
//!
//! Looks up cryptocurrency market data from CoinGecko, keeps a short-lived
//! in-memory cache of provider responses, and stores a personal watchlist in
//! SQLite.
//!
//! ## Usage
//!
//! The cache is an explicit value handed to the client, not a global:
//!
//! ```no_run
//! use std::sync::Arc;
//! use coin_watchlist::{cache::ResponseCache, providers::CoinGeckoProvider, MarketDataClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = Arc::new(CoinGeckoProvider::new(None)?);
//! let client = MarketDataClient::new(provider, Arc::new(ResponseCache::new()));
//!
//! let summary = client.fetch_global_summary().await?;
//! println!("BTC dominance: {:.1}%", summary.btc_dominance);
//!
//! for coin in client.fetch_top_by_volume(10).await? {
//!     println!("{:<8} ${:.2}", coin.symbol, coin.price);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Caching
//!
//! Responses are cached for `CACHE_TTL_SECS` (120 s) under the coin id,
//! `top_volume_{limit}`, or `global`. Expired entries are simply refetched;
//! there is no eviction and no request coalescing.
//!
//! ## Error Handling
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use coin_watchlist::{cache::ResponseCache, providers::CoinGeckoProvider, MarketDataClient};
//! use coin_watchlist::MarketDataError;
//!
//! # async fn example(client: MarketDataClient) {
//! match client.fetch_coin("doesnotexist123").await {
//!     Ok(coin) => println!("{}: ${:.2}", coin.symbol, coin.price),
//!     Err(MarketDataError::NotFound(id)) => println!("no such coin: {id}"),
//!     Err(e) => eprintln!("{e}"),
//! }
//! # }
//! ```

pub mod cache;
pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod metrics;
pub mod provider;
pub mod providers;
pub mod types;
pub mod watchlist;
pub mod web;

// Re-export commonly used types
pub use client::MarketDataClient;
pub use config::AppConfig;
pub use error::{MarketDataError, WatchlistError};
pub use metrics::ProviderMetrics;
pub use types::{
    CacheDiagnostics, CoinSnapshot, GlobalMarketSummary, MarketListing, NewWatchlistEntry,
    WatchlistEntry,
};
pub use watchlist::WatchlistStore;
