//! Health Snapshot Types
//!
//! Point-in-time report values. Built per query, never stored.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Overall health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "healthy"),
            HealthStatus::Degraded => write!(f, "degraded"),
        }
    }
}

/// Memory figures in bytes
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryUsage {
    /// Resident set size of this process
    pub rss: u64,
    #[serde(rename = "virtual")]
    pub virtual_memory: u64,
    pub system_total: u64,
    pub system_used: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuUsage {
    /// 1, 5 and 15 minute load averages
    pub load_average: [f64; 3],
    pub cores: usize,
}

/// What is running and where
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuntimeIdentity {
    pub name: String,
    pub version: String,
    pub os: String,
    pub arch: String,
    pub pid: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerHealth {
    /// Seconds since the telemetry store was created
    pub uptime: u64,
    pub memory: MemoryUsage,
    pub cpu: CpuUsage,
    pub runtime: RuntimeIdentity,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseHealth {
    pub connected: bool,
    /// Probe round trip in milliseconds, up to the failure if it failed
    pub response_time: u64,
    pub active_connections: u32,
    /// Error percentage across all recorded API requests
    pub error_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    pub total_requests: u64,
    pub total_errors: u64,
    pub average_response_time: f64,
    pub requests_per_minute: f64,
    pub slow_endpoints_percentage: u32,
    pub tracked_endpoints: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityHealth {
    pub failed_logins: usize,
    pub blocked_requests: usize,
    pub suspicious_activity: usize,
    /// RFC 3339 timestamp, or "No recent events"
    pub last_security_event: String,
}

/// Aggregated process, storage, API and security report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemHealthSnapshot {
    pub status: HealthStatus,
    pub server: ServerHealth,
    pub database: DatabaseHealth,
    pub api: ApiHealth,
    pub security: SecurityHealth,
}

/// Filesystem usage in bytes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiskUsage {
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub percentage: f64,
}
