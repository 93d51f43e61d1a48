//! In-memory TTL cache for provider responses

use crate::{
    constants::CACHE_TTL_SECS,
    types::{CacheDiagnostics, CoinSnapshot, GlobalMarketSummary, MarketListing},
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Source of "now" for expiry checks
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock in UTC
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Anything the client caches
#[derive(Debug, Clone, PartialEq)]
pub enum CachedPayload {
    Coin(CoinSnapshot),
    TopVolume(Vec<MarketListing>),
    Global(GlobalMarketSummary),
}

/// A cached payload with the time it was captured
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub payload: CachedPayload,
    pub captured_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Valid while strictly less than `ttl` has elapsed since capture
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        let age = now.signed_duration_since(self.captured_at);
        match chrono::Duration::from_std(ttl) {
            Ok(ttl) => age < ttl,
            Err(_) => true,
        }
    }
}

/// Flat key -> payload map with a fixed time-to-live
///
/// Expired entries are not evicted; they read as misses and get overwritten by
/// the next successful fetch for the same key. The lock only guards the map
/// itself and is never held across a provider call.
pub struct ResponseCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl ResponseCache {
    /// Creates an empty cache with the default TTL and the system clock
    pub fn new() -> Self {
        Self::with_clock(Duration::from_secs(CACHE_TTL_SECS), Arc::new(SystemClock))
    }

    /// Creates an empty cache with a custom TTL and clock
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    /// Returns the payload under `key` if it is still fresh
    pub async fn get(&self, key: &str) -> Option<CachedPayload> {
        let now = self.clock.now();
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;
        if entry.is_fresh(now, self.ttl) {
            Some(entry.payload.clone())
        } else {
            tracing::debug!(key, captured_at = %entry.captured_at, "Cache entry expired");
            None
        }
    }

    /// Stores `payload` under `key`, stamped with the current time
    pub async fn insert(&self, key: impl Into<String>, payload: CachedPayload) {
        let captured_at = self.clock.now();
        let mut entries = self.entries.write().await;
        entries.insert(
            key.into(),
            CacheEntry {
                payload,
                captured_at,
            },
        );
    }

    /// Drops every entry
    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        let dropped = entries.len();
        entries.clear();
        tracing::debug!(dropped, "Cache cleared");
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Introspection snapshot; does not touch entries
    pub async fn diagnostics(&self) -> CacheDiagnostics {
        let entries = self.entries.read().await;
        let mut keys: Vec<String> = entries.keys().cloned().collect();
        keys.sort();

        CacheDiagnostics {
            size: keys.len(),
            keys,
            ttl_seconds: self.ttl.as_secs(),
        }
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub mod test_clock {
    use super::*;
    use std::sync::Mutex;

    /// Clock that only moves when told to
    pub struct ManualClock {
        now: Mutex<DateTime<Utc>>,
    }

    impl ManualClock {
        pub fn new(start: DateTime<Utc>) -> Self {
            Self {
                now: Mutex::new(start),
            }
        }

        pub fn advance(&self, by: Duration) {
            let mut now = self.now.lock().unwrap();
            *now += chrono::Duration::from_std(by).unwrap();
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.now.lock().unwrap()
        }
    }
}
