//! Constants for the coin watchlist service
//!
//! Compile-time defaults live here. Anything a deployment may need to change
//! (API key, base URL, database location, bind address) is read at startup by
//! the `config` module and falls back to these values.

/// How long a cached provider response stays valid (in seconds)
pub const CACHE_TTL_SECS: u64 = 120;

/// HTTP request timeout when calling the provider (in seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Number of listings returned by the top-by-volume page
pub const DEFAULT_TOP_LIMIT: u32 = 10;

/// CoinGecko API base URL
pub const COINGECKO_API_URL: &str = "https://api.coingecko.com/api/v3";

/// CoinGecko path segment for coin endpoints (`/coins/{id}`, `/coins/markets`)
pub const COINGECKO_COINS_SEGMENT: &str = "coins";

/// CoinGecko path segment for market listings, below `/coins`
pub const COINGECKO_MARKETS_SEGMENT: &str = "markets";

/// CoinGecko path segment for global aggregates
pub const COINGECKO_GLOBAL_SEGMENT: &str = "global";

/// Header carrying the CoinGecko API key
pub const API_KEY_HEADER: &str = "x-cg-api-key";

/// Value shipped in sample `.env` files; never sent upstream
pub const API_KEY_PLACEHOLDER: &str = "your_key_here";

/// Cache key for the global market summary
pub const GLOBAL_CACHE_KEY: &str = "global";

/// Prefix for top-by-volume cache keys, followed by the limit
pub const TOP_VOLUME_CACHE_PREFIX: &str = "top_volume_";

/// Default SQLite database location
pub const DEFAULT_DATABASE_URL: &str = "sqlite://watchlist.db";

/// Default HTTP bind address
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";

/// User agent for HTTP requests
pub const USER_AGENT: &str = concat!("coin-watchlist/", env!("CARGO_PKG_VERSION"));
