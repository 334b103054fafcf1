//! Telemetry Module
//!
//! Process-wide endpoint performance and security event stores.

mod config;
mod endpoint;
pub mod performance;
pub mod security;

pub use config::{TelemetryConfig, DEFAULT_TRACKED_TABLES};
pub use endpoint::{normalize_path, EndpointKey, ID_PLACEHOLDER};
pub use performance::{PerformanceAggregate, PerformanceAggregator};
pub use security::{
    NewSecurityEvent, SecurityEvent, SecurityEventKind, SecurityEventLog, Severity,
    NO_RECENT_EVENTS,
};

use std::time::{Duration, Instant};

/// Round to two decimal places
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Owner of all live telemetry state
///
/// Created once at startup and shared by `Arc` with everything that records
/// or queries telemetry. Dropping it (or restarting) discards all state.
#[derive(Debug)]
pub struct TelemetryStore {
    config: TelemetryConfig,
    performance: PerformanceAggregator,
    security: SecurityEventLog,
    start_time: Instant,
}

impl Default for TelemetryStore {
    fn default() -> Self {
        Self::new(TelemetryConfig::default())
    }
}

impl TelemetryStore {
    pub fn new(config: TelemetryConfig) -> Self {
        Self {
            performance: PerformanceAggregator::new(config.max_endpoints),
            security: SecurityEventLog::new(config.max_security_events),
            start_time: Instant::now(),
            config,
        }
    }

    /// Record a completed request. `success` is decided by the caller.
    pub fn record_api_performance(
        &self,
        endpoint: &str,
        method: &str,
        response_time_ms: f64,
        success: bool,
    ) {
        let key = if self.config.normalize_paths {
            EndpointKey::normalized(method, endpoint)
        } else {
            EndpointKey::raw(method, endpoint)
        };
        self.performance.record(key, response_time_ms, success);
    }

    /// Convenience wrapper over [`Self::record_api_performance`]
    pub fn record_request(&self, endpoint: &str, method: &str, elapsed: Duration, success: bool) {
        self.record_api_performance(endpoint, method, elapsed.as_secs_f64() * 1000.0, success);
    }

    /// Append a security event; id and timestamp are assigned here
    pub fn record_security_event(&self, event: NewSecurityEvent) {
        self.security.append(event);
    }

    pub fn performance(&self) -> &PerformanceAggregator {
        &self.performance
    }

    pub fn security(&self) -> &SecurityEventLog {
        &self.security
    }

    pub fn config(&self) -> &TelemetryConfig {
        &self.config
    }

    /// Time since the store was created
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(33.333333), 33.33);
        assert_eq!(round2(66.666666), 66.67);
        assert_eq!(round2(0.0), 0.0);
    }

    #[test]
    fn test_store_normalizes_routes() {
        let store = TelemetryStore::default();
        store.record_api_performance("/users/42", "get", 100.0, true);
        store.record_api_performance("/users/77", "GET", 300.0, false);

        let snapshot = store.performance().snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].endpoint, "/users/:id");
        assert_eq!(snapshot[0].method, "GET");
        assert_eq!(snapshot[0].total_requests, 2);
        assert_eq!(snapshot[0].average_response_time_ms, 200.0);
        assert_eq!(snapshot[0].error_rate, 50.0);
    }

    #[test]
    fn test_store_raw_routes() {
        let store = TelemetryStore::new(TelemetryConfig::default().with_normalize_paths(false));
        store.record_api_performance("/users/42", "GET", 1.0, true);
        store.record_api_performance("/users/77", "GET", 1.0, true);
        assert_eq!(store.performance().len(), 2);
    }

    #[test]
    fn test_store_caps() {
        let config = TelemetryConfig::default()
            .with_max_endpoints(3)
            .with_max_security_events(5);
        let store = TelemetryStore::new(config);

        for i in 0..10 {
            store.record_api_performance(&format!("/route{}", i), "GET", 1.0, true);
            store.record_security_event(NewSecurityEvent::failed_login("127.0.0.1"));
        }

        assert_eq!(store.performance().len(), 3);
        assert_eq!(store.security().len(), 5);
    }

    #[test]
    fn test_record_request_duration() {
        let store = TelemetryStore::default();
        store.record_request("/files", "GET", Duration::from_millis(250), true);
        let stats = store.performance().snapshot();
        assert!((stats[0].average_response_time_ms - 250.0).abs() < 1e-6);
    }
}
