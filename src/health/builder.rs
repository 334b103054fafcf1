//! Health Snapshot Builder
//!
//! Combines process stats, one storage probe and reads of the telemetry
//! stores into a single report.

use super::process::ProcessInspector;
use super::snapshot::{
    ApiHealth, DatabaseHealth, HealthStatus, SecurityHealth, ServerHealth, SystemHealthSnapshot,
};
use crate::error::Result;
use crate::storage::StorageProbe;
use crate::telemetry::performance::{
    global_average_response_time, slow_endpoint_percentage, total_errors, total_requests,
};
use crate::telemetry::{round2, SecurityEventKind, TelemetryStore};
use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Logical connection count reported for the storage pool
const ACTIVE_CONNECTIONS: u32 = 1;

/// Outcome of the storage health probe
#[derive(Debug, Clone, Copy)]
struct ProbeOutcome {
    connected: bool,
    elapsed: Duration,
}

pub struct HealthSnapshotBuilder {
    store: Arc<TelemetryStore>,
    storage: Arc<dyn StorageProbe>,
    inspector: ProcessInspector,
}

impl HealthSnapshotBuilder {
    pub fn new(store: Arc<TelemetryStore>, storage: Arc<dyn StorageProbe>) -> Self {
        Self {
            store,
            storage,
            inspector: ProcessInspector::new(),
        }
    }

    /// Build a fresh snapshot.
    ///
    /// A failing or slow storage probe degrades the report (`connected=false`)
    /// instead of failing it. Only process introspection errors are returned.
    pub async fn build(&self) -> Result<SystemHealthSnapshot> {
        let uptime = self.store.uptime();
        let process = self.inspector.sample()?;

        let probe = self.probe_storage().await;

        let records = self.store.performance().snapshot();
        let requests = total_requests(&records);
        let errors = total_errors(&records);
        let error_rate = if requests == 0 {
            0.0
        } else {
            round2(errors as f64 / requests as f64 * 100.0)
        };

        let api = ApiHealth {
            total_requests: requests,
            total_errors: errors,
            average_response_time: round2(global_average_response_time(&records)),
            requests_per_minute: requests_per_minute(requests, uptime),
            slow_endpoints_percentage: slow_endpoint_percentage(
                &records,
                self.store.config().slow_threshold_ms,
            ),
            tracked_endpoints: records.len(),
        };

        let log = self.store.security();
        let security = SecurityHealth {
            failed_logins: log.count_by_type(&SecurityEventKind::FailedLogin),
            blocked_requests: log.count_by_type(&SecurityEventKind::BlockedRequest),
            suspicious_activity: log.count_by_type(&SecurityEventKind::SuspiciousActivity),
            last_security_event: log.last_event_timestamp(),
        };

        let status = if probe.connected {
            HealthStatus::Healthy
        } else {
            HealthStatus::Degraded
        };

        Ok(SystemHealthSnapshot {
            status,
            server: ServerHealth {
                uptime: uptime.as_secs(),
                memory: process.memory,
                cpu: process.cpu,
                runtime: process.runtime,
                timestamp: Utc::now(),
            },
            database: DatabaseHealth {
                connected: probe.connected,
                response_time: probe.elapsed.as_millis() as u64,
                active_connections: ACTIVE_CONNECTIONS,
                error_rate,
            },
            api,
            security,
        })
    }

    async fn probe_storage(&self) -> ProbeOutcome {
        let timeout = self.store.config().probe_timeout;
        let start = Instant::now();
        let result = tokio::time::timeout(timeout, self.storage.health_check()).await;
        let elapsed = start.elapsed();

        let connected = match result {
            Ok(Ok(())) => {
                debug!(elapsed = ?elapsed, "Storage probe succeeded");
                true
            }
            Ok(Err(e)) => {
                warn!(error = %e, elapsed = ?elapsed, "Storage probe failed");
                false
            }
            Err(_) => {
                warn!(timeout = ?timeout, "Storage probe timed out");
                false
            }
        };

        ProbeOutcome { connected, elapsed }
    }
}

/// `total / (uptime / 60)`, 0 before the first second has elapsed
fn requests_per_minute(total: u64, uptime: Duration) -> f64 {
    let minutes = uptime.as_secs_f64() / 60.0;
    if minutes <= 0.0 {
        return 0.0;
    }
    round2(total as f64 / minutes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use crate::storage::MemoryStorage;
    use crate::telemetry::{NewSecurityEvent, TelemetryConfig};
    use async_trait::async_trait;

    struct BrokenStorage;

    #[async_trait]
    impl StorageProbe for BrokenStorage {
        async fn health_check(&self) -> std::result::Result<(), StorageError> {
            Err(StorageError::Unavailable("no route to host".into()))
        }

        async fn count(&self, _table: &str) -> std::result::Result<u64, StorageError> {
            Err(StorageError::Unavailable("no route to host".into()))
        }
    }

    fn populated_store() -> Arc<TelemetryStore> {
        let store = Arc::new(TelemetryStore::default());
        store.record_api_performance("/users", "GET", 200.0, true);
        store.record_api_performance("/users", "GET", 400.0, false);
        store.record_api_performance("/reports", "GET", 3000.0, true);
        store.record_security_event(NewSecurityEvent::failed_login("10.0.0.1"));
        store.record_security_event(NewSecurityEvent::failed_login("10.0.0.2"));
        store.record_security_event(NewSecurityEvent::blocked_request("10.0.0.3", "banned"));
        store
    }

    #[tokio::test]
    async fn test_build_healthy() {
        let store = populated_store();
        let builder = HealthSnapshotBuilder::new(store, Arc::new(MemoryStorage::new()));

        let snapshot = builder.build().await.unwrap();
        assert_eq!(snapshot.status, HealthStatus::Healthy);
        assert!(snapshot.database.connected);
        assert_eq!(snapshot.database.active_connections, 1);
        assert_eq!(snapshot.database.error_rate, 33.33);

        assert_eq!(snapshot.api.total_requests, 3);
        assert_eq!(snapshot.api.total_errors, 1);
        assert_eq!(snapshot.api.average_response_time, 1200.0);
        assert_eq!(snapshot.api.slow_endpoints_percentage, 50);
        assert_eq!(snapshot.api.tracked_endpoints, 2);

        assert_eq!(snapshot.security.failed_logins, 2);
        assert_eq!(snapshot.security.blocked_requests, 1);
        assert_eq!(snapshot.security.suspicious_activity, 0);
        assert_ne!(snapshot.security.last_security_event, crate::telemetry::NO_RECENT_EVENTS);
    }

    #[tokio::test]
    async fn test_build_with_failing_probe() {
        let store = populated_store();
        let builder = HealthSnapshotBuilder::new(store, Arc::new(BrokenStorage));

        let snapshot = builder.build().await.unwrap();
        assert_eq!(snapshot.status, HealthStatus::Degraded);
        assert!(!snapshot.database.connected);
        assert!(snapshot.server.memory.rss > 0);
        assert_eq!(snapshot.api.total_requests, 3);
        assert_eq!(snapshot.security.failed_logins, 2);
    }

    #[tokio::test]
    async fn test_build_with_slow_probe() {
        let config = TelemetryConfig::default().with_probe_timeout(Duration::from_millis(50));
        let store = Arc::new(TelemetryStore::new(config));
        let storage = MemoryStorage::new();
        storage.set_latency(Duration::from_millis(500));

        let builder = HealthSnapshotBuilder::new(store, Arc::new(storage));
        let snapshot = builder.build().await.unwrap();

        assert!(!snapshot.database.connected);
        assert!(snapshot.database.response_time >= 50);
        assert!(snapshot.database.response_time < 500);
    }

    #[tokio::test]
    async fn test_build_on_cold_store() {
        let store = Arc::new(TelemetryStore::default());
        let builder = HealthSnapshotBuilder::new(store.clone(), Arc::new(MemoryStorage::new()));

        let snapshot = builder.build().await.unwrap();
        assert_eq!(snapshot.api.total_requests, 0);
        assert_eq!(snapshot.api.average_response_time, 0.0);
        assert_eq!(snapshot.database.error_rate, 0.0);
        assert_eq!(snapshot.security.last_security_event, "No recent events");

        // Read-only with respect to the stores
        assert!(store.performance().is_empty());
        assert!(store.security().is_empty());
    }

    #[test]
    fn test_requests_per_minute() {
        assert_eq!(requests_per_minute(120, Duration::from_secs(120)), 60.0);
        assert_eq!(requests_per_minute(10, Duration::ZERO), 0.0);
        assert_eq!(requests_per_minute(1, Duration::from_secs(180)), 0.33);
    }

    #[test]
    fn test_snapshot_serializes_camel_case() {
        let store = populated_store();
        let builder = HealthSnapshotBuilder::new(store, Arc::new(MemoryStorage::new()));
        let snapshot = tokio_test::block_on(builder.build()).unwrap();

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["status"], "healthy");
        assert!(json["api"]["requestsPerMinute"].is_number());
        assert!(json["database"]["responseTime"].is_number());
        assert!(json["security"]["lastSecurityEvent"].is_string());
        assert!(json["server"]["memory"]["virtual"].is_number());
        assert_eq!(json["server"]["cpu"]["loadAverage"].as_array().unwrap().len(), 3);
    }
}
