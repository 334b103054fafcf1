//! ORGPULSE - Operational Telemetry for the Company Directory
//!
//! In-process aggregation of per-endpoint performance statistics and
//! security events, with on-demand system health snapshots and a small
//! read-only admin API.

pub mod admin;
pub mod error;
pub mod health;
pub mod logging;
pub mod server;
pub mod storage;
pub mod telemetry;

pub use admin::{AdminApi, AdminConfig, AdminRequest, AdminResponse};
pub use error::{Result, StorageError, TelemetryError};
pub use health::{HealthSnapshotBuilder, SystemHealthSnapshot};
pub use logging::{LogBuffer, LogEntry};
pub use server::{AdminServer, ServerConfig};
pub use storage::{DatabaseMetricsProbe, MemoryStorage, StorageProbe, TableMetrics};
pub use telemetry::{
    NewSecurityEvent, PerformanceAggregate, PerformanceAggregator, SecurityEvent,
    SecurityEventKind, SecurityEventLog, Severity, TelemetryConfig, TelemetryStore,
};
