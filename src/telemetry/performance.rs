//! Endpoint Performance Aggregation
//!
//! One running statistic per endpoint key. Averages and error rates are
//! maintained incrementally; no raw samples are retained.

use super::endpoint::EndpointKey;
use super::round2;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Running statistics for one endpoint key
#[derive(Debug, Clone)]
struct EndpointStats {
    total_requests: u64,
    total_errors: u64,
    average_response_time_ms: f64,
    error_rate: f64,
    last_accessed: DateTime<Utc>,
    /// Recording sequence number, used for least-recently-used eviction
    last_tick: u64,
}

impl EndpointStats {
    fn first(response_time_ms: f64, success: bool, tick: u64) -> Self {
        Self {
            total_requests: 1,
            total_errors: u64::from(!success),
            average_response_time_ms: response_time_ms,
            error_rate: if success { 0.0 } else { 100.0 },
            last_accessed: Utc::now(),
            last_tick: tick,
        }
    }

    fn update(&mut self, response_time_ms: f64, success: bool, tick: u64) {
        let old_count = self.total_requests as f64;
        self.total_requests += 1;
        let new_count = self.total_requests as f64;

        self.average_response_time_ms =
            (self.average_response_time_ms * old_count + response_time_ms) / new_count;

        if !success {
            self.total_errors += 1;
        }
        self.error_rate = round2(self.total_errors as f64 / new_count * 100.0);

        self.last_accessed = Utc::now();
        self.last_tick = tick;
    }
}

/// Point-in-time view of one endpoint's statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceAggregate {
    pub endpoint: String,
    pub method: String,
    pub total_requests: u64,
    pub total_errors: u64,
    pub average_response_time_ms: f64,
    pub error_rate: f64,
    pub last_accessed: DateTime<Utc>,
}

/// Concurrent per-endpoint performance aggregator
///
/// Each `record` performs its read-modify-write under the owning shard's
/// entry lock, so concurrent recordings for the same key are never lost.
#[derive(Debug)]
pub struct PerformanceAggregator {
    entries: DashMap<EndpointKey, EndpointStats>,
    /// Maximum number of keys (0 = unlimited)
    max_endpoints: usize,
    clock: AtomicU64,
}

impl Default for PerformanceAggregator {
    fn default() -> Self {
        Self::new(0)
    }
}

impl PerformanceAggregator {
    /// Create an aggregator holding at most `max_endpoints` keys (0 = unlimited)
    pub fn new(max_endpoints: usize) -> Self {
        Self {
            entries: DashMap::new(),
            max_endpoints,
            clock: AtomicU64::new(0),
        }
    }

    /// Record one completed request. Never fails.
    pub fn record(&self, key: EndpointKey, response_time_ms: f64, success: bool) {
        let response_time_ms = if response_time_ms.is_finite() && response_time_ms > 0.0 {
            response_time_ms
        } else {
            0.0
        };
        let tick = self.clock.fetch_add(1, Ordering::Relaxed);

        if self.max_endpoints > 0 && !self.entries.contains_key(&key) {
            self.evict_to(self.max_endpoints - 1);
        }

        self.entries
            .entry(key)
            .and_modify(|stats| stats.update(response_time_ms, success, tick))
            .or_insert_with(|| EndpointStats::first(response_time_ms, success, tick));
    }

    /// Evict least recently used keys until at most `target` remain
    fn evict_to(&self, target: usize) {
        while self.entries.len() > target {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|e| e.value().last_tick)
                .map(|e| e.key().clone());

            match oldest {
                Some(key) => {
                    debug!(endpoint = %key, "Evicting least recently used endpoint");
                    self.entries.remove(&key);
                }
                None => break,
            }
        }
    }

    /// Current records, busiest first
    pub fn snapshot(&self) -> Vec<PerformanceAggregate> {
        let mut records: Vec<PerformanceAggregate> = self
            .entries
            .iter()
            .map(|e| {
                let (key, stats) = e.pair();
                PerformanceAggregate {
                    endpoint: key.endpoint.clone(),
                    method: key.method.clone(),
                    total_requests: stats.total_requests,
                    total_errors: stats.total_errors,
                    average_response_time_ms: stats.average_response_time_ms,
                    error_rate: stats.error_rate,
                    last_accessed: stats.last_accessed,
                }
            })
            .collect();

        records.sort_by(|a, b| {
            b.total_requests
                .cmp(&a.total_requests)
                .then_with(|| a.endpoint.cmp(&b.endpoint))
                .then_with(|| a.method.cmp(&b.method))
        });
        records
    }

    /// Look up a single key
    pub fn get(&self, key: &EndpointKey) -> Option<PerformanceAggregate> {
        self.entries.get(key).map(|stats| PerformanceAggregate {
            endpoint: key.endpoint.clone(),
            method: key.method.clone(),
            total_requests: stats.total_requests,
            total_errors: stats.total_errors,
            average_response_time_ms: stats.average_response_time_ms,
            error_rate: stats.error_rate,
            last_accessed: stats.last_accessed,
        })
    }

    /// Number of tracked keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Total requests across all records
pub fn total_requests(records: &[PerformanceAggregate]) -> u64 {
    records.iter().map(|r| r.total_requests).sum()
}

/// Total failed requests across all records
pub fn total_errors(records: &[PerformanceAggregate]) -> u64 {
    records.iter().map(|r| r.total_errors).sum()
}

/// Request-weighted mean of the per-endpoint averages (0 when empty)
pub fn global_average_response_time(records: &[PerformanceAggregate]) -> f64 {
    let total = total_requests(records);
    if total == 0 {
        return 0.0;
    }

    let weighted: f64 = records
        .iter()
        .map(|r| r.average_response_time_ms * r.total_requests as f64)
        .sum();
    weighted / total as f64
}

/// Percentage of distinct endpoints (not requests) whose average exceeds
/// `threshold_ms`, rounded to an integer
pub fn slow_endpoint_percentage(records: &[PerformanceAggregate], threshold_ms: f64) -> u32 {
    if records.is_empty() {
        return 0;
    }

    let slow = records
        .iter()
        .filter(|r| r.average_response_time_ms > threshold_ms)
        .count();
    (slow as f64 / records.len() as f64 * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn key(path: &str) -> EndpointKey {
        EndpointKey::raw("GET", path)
    }

    fn aggregate(endpoint: &str, average: f64, requests: u64) -> PerformanceAggregate {
        PerformanceAggregate {
            endpoint: endpoint.to_string(),
            method: "GET".to_string(),
            total_requests: requests,
            total_errors: 0,
            average_response_time_ms: average,
            error_rate: 0.0,
            last_accessed: Utc::now(),
        }
    }

    #[test]
    fn test_identical_successes_keep_average() {
        let perf = PerformanceAggregator::default();
        for _ in 0..25 {
            perf.record(key("/users"), 120.0, true);
        }

        let stats = perf.get(&key("/users")).unwrap();
        assert_eq!(stats.total_requests, 25);
        assert!((stats.average_response_time_ms - 120.0).abs() < 1e-9);
        assert_eq!(stats.error_rate, 0.0);
    }

    #[test]
    fn test_failure_then_success() {
        let perf = PerformanceAggregator::default();
        perf.record(key("/login"), 10.0, false);
        assert_eq!(perf.get(&key("/login")).unwrap().error_rate, 100.0);

        perf.record(key("/login"), 10.0, true);
        let stats = perf.get(&key("/login")).unwrap();
        assert_eq!(stats.total_requests, 2);
        assert_eq!(stats.error_rate, 50.0);
    }

    #[test]
    fn test_mixed_recordings() {
        let perf = PerformanceAggregator::default();
        perf.record(key("/companies"), 200.0, true);
        perf.record(key("/companies"), 200.0, true);
        perf.record(key("/companies"), 200.0, true);
        perf.record(key("/companies"), 5000.0, false);

        let stats = perf.get(&key("/companies")).unwrap();
        assert_eq!(stats.total_requests, 4);
        assert!((stats.average_response_time_ms - 1400.0).abs() < 1e-9);
        assert_eq!(stats.error_rate, 25.0);
        assert_eq!(stats.total_errors, 1);
    }

    #[test]
    fn test_error_rate_does_not_drift() {
        let perf = PerformanceAggregator::default();
        for i in 0..3000 {
            perf.record(key("/feed"), 50.0, i % 3 != 0);
        }

        let stats = perf.get(&key("/feed")).unwrap();
        assert_eq!(stats.total_errors, 1000);
        assert_eq!(stats.error_rate, 33.33);
    }

    #[test]
    fn test_invalid_response_time_is_clamped() {
        let perf = PerformanceAggregator::default();
        perf.record(key("/files"), -5.0, true);
        perf.record(key("/files"), f64::NAN, true);

        let stats = perf.get(&key("/files")).unwrap();
        assert_eq!(stats.total_requests, 2);
        assert_eq!(stats.average_response_time_ms, 0.0);
    }

    #[test]
    fn test_lru_eviction() {
        let perf = PerformanceAggregator::new(2);
        perf.record(key("/a"), 1.0, true);
        perf.record(key("/b"), 1.0, true);
        perf.record(key("/a"), 1.0, true);
        perf.record(key("/c"), 1.0, true);

        assert_eq!(perf.len(), 2);
        assert!(perf.get(&key("/a")).is_some());
        assert!(perf.get(&key("/b")).is_none());
        assert!(perf.get(&key("/c")).is_some());
    }

    #[test]
    fn test_snapshot_ordering() {
        let perf = PerformanceAggregator::default();
        perf.record(key("/quiet"), 1.0, true);
        perf.record(key("/busy"), 1.0, true);
        perf.record(key("/busy"), 1.0, true);

        let snapshot = perf.snapshot();
        assert_eq!(snapshot[0].endpoint, "/busy");
        assert_eq!(snapshot[1].endpoint, "/quiet");
    }

    #[test]
    fn test_concurrent_recording() {
        let perf = Arc::new(PerformanceAggregator::default());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let perf = perf.clone();
                std::thread::spawn(move || {
                    for i in 0..500 {
                        perf.record(key("/shared"), 100.0, (i + t) % 4 != 0);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let stats = perf.get(&key("/shared")).unwrap();
        assert_eq!(stats.total_requests, 4000);
        assert_eq!(stats.total_errors, 1000);
        assert_eq!(stats.error_rate, 25.0);
    }

    #[test]
    fn test_slow_endpoint_percentage() {
        let records = vec![
            aggregate("/a", 500.0, 100),
            aggregate("/b", 1500.0, 1),
            aggregate("/c", 2000.0, 1),
        ];
        assert_eq!(slow_endpoint_percentage(&records, 1000.0), 67);
        assert_eq!(slow_endpoint_percentage(&[], 1000.0), 0);
    }

    #[test]
    fn test_global_average_is_request_weighted() {
        let records = vec![aggregate("/a", 100.0, 3), aggregate("/b", 500.0, 1)];
        assert!((global_average_response_time(&records) - 200.0).abs() < 1e-9);
        assert_eq!(global_average_response_time(&[]), 0.0);
        assert_eq!(total_requests(&records), 4);
    }
}
