//! Outbound request and cache counters
//!
//! Tracks a rolling latency window for provider calls plus lifetime cache
//! hit/miss counts, surfaced through the diagnostics route.

use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// Maximum number of latency samples kept for percentile calculation
const MAX_SAMPLES: usize = 100;

/// Point-in-time view of the collected metrics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderMetrics {
    pub provider_name: String,
    /// 50th percentile latency of successful calls in milliseconds
    pub latency_p50_ms: f64,
    /// 99th percentile latency of successful calls in milliseconds
    pub latency_p99_ms: f64,
    /// Success rate over the lifetime of the process (0.0 to 1.0)
    pub success_rate: f64,
    pub total_requests: u64,
    pub failed_requests: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
}

#[derive(Debug, Default)]
struct Counters {
    samples: VecDeque<f64>,
    total_requests: u64,
    failed_requests: u64,
    cache_hits: u64,
    cache_misses: u64,
}

/// Collects metrics for one provider
#[derive(Debug)]
pub struct MetricsCollector {
    provider_name: String,
    counters: Mutex<Counters>,
}

impl MetricsCollector {
    pub fn new(provider_name: &str) -> Self {
        Self {
            provider_name: provider_name.to_string(),
            counters: Mutex::new(Counters {
                samples: VecDeque::with_capacity(MAX_SAMPLES),
                ..Counters::default()
            }),
        }
    }

    /// Records one provider call; only successful calls feed the latency window
    pub fn record_request(&self, duration: Duration, success: bool) {
        let mut counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        counters.total_requests += 1;
        if !success {
            counters.failed_requests += 1;
            return;
        }

        if counters.samples.len() >= MAX_SAMPLES {
            counters.samples.pop_front();
        }
        counters.samples.push_back(duration.as_secs_f64() * 1000.0);
    }

    pub fn record_cache_hit(&self) {
        self.counters
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .cache_hits += 1;
    }

    pub fn record_cache_miss(&self) {
        self.counters
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .cache_misses += 1;
    }

    pub fn snapshot(&self) -> ProviderMetrics {
        let counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());

        let mut latencies: Vec<f64> = counters.samples.iter().copied().collect();
        latencies.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let success_rate = if counters.total_requests > 0 {
            (counters.total_requests - counters.failed_requests) as f64
                / counters.total_requests as f64
        } else {
            1.0
        };

        ProviderMetrics {
            provider_name: self.provider_name.clone(),
            latency_p50_ms: percentile(&latencies, 50.0),
            latency_p99_ms: percentile(&latencies, 99.0),
            success_rate,
            total_requests: counters.total_requests,
            failed_requests: counters.failed_requests,
            cache_hits: counters.cache_hits,
            cache_misses: counters.cache_misses,
        }
    }
}

/// Nearest-rank percentile over sorted values
fn percentile(sorted_values: &[f64], p: f64) -> f64 {
    if sorted_values.is_empty() {
        return 0.0;
    }

    let idx = (p / 100.0 * (sorted_values.len() - 1) as f64).round() as usize;
    sorted_values[idx.min(sorted_values.len() - 1)]
}
