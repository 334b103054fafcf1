//! Admin Read API
//!
//! Read-only monitoring endpoints over the telemetry store. Callers are
//! expected to have authenticated and authorized the request already.

use super::response::{AdminRequest, AdminResponse};
use crate::health::{DiskUsageProbe, HealthSnapshotBuilder};
use crate::logging::LogBuffer;
use crate::storage::{DatabaseMetricsProbe, StorageProbe};
use crate::telemetry::TelemetryStore;
use std::sync::Arc;
use tracing::{error, warn};

/// Admin API configuration
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// Optional path prefix, stripped before routing
    pub prefix: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            prefix: "/admin".to_string(),
        }
    }
}

impl AdminConfig {
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.trim_end_matches('/').to_string();
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    SystemHealth,
    Performance,
    Database,
    Security,
    Logs,
    DiskUsage,
}

impl Route {
    fn from_path(path: &str) -> Option<Self> {
        match path.trim_end_matches('/') {
            "/system-health" => Some(Route::SystemHealth),
            "/performance" => Some(Route::Performance),
            "/database" => Some(Route::Database),
            "/security" => Some(Route::Security),
            "/logs" => Some(Route::Logs),
            "/disk-usage" => Some(Route::DiskUsage),
            _ => None,
        }
    }
}

/// Admin API router
pub struct AdminApi {
    config: AdminConfig,
    store: Arc<TelemetryStore>,
    health: HealthSnapshotBuilder,
    tables: DatabaseMetricsProbe,
    disk: DiskUsageProbe,
    logs: LogBuffer,
}

impl AdminApi {
    pub fn new(
        config: AdminConfig,
        store: Arc<TelemetryStore>,
        storage: Arc<dyn StorageProbe>,
        logs: LogBuffer,
    ) -> Self {
        let telemetry = store.config().clone();
        Self {
            config,
            health: HealthSnapshotBuilder::new(store.clone(), storage.clone()),
            tables: DatabaseMetricsProbe::new(
                storage,
                telemetry.tracked_tables,
                telemetry.probe_timeout,
            ),
            disk: DiskUsageProbe::new(telemetry.disk_path),
            store,
            logs,
        }
    }

    /// Handle a request
    pub async fn handle(&self, req: &AdminRequest) -> AdminResponse {
        let path = self.strip_prefix(&req.path);
        let Some(route) = Route::from_path(path) else {
            return AdminResponse::not_found();
        };

        if req.method != "GET" {
            return AdminResponse::method_not_allowed();
        }

        let defaults = self.store.config();
        match route {
            Route::SystemHealth => match self.health.build().await {
                Ok(snapshot) => AdminResponse::ok(&snapshot),
                Err(e) => {
                    error!(error = %e, "System health snapshot failed");
                    AdminResponse::error(500, "Failed to get system health")
                }
            },
            Route::Performance => AdminResponse::ok(&self.store.performance().snapshot()),
            Route::Database => AdminResponse::ok(&self.tables.collect().await),
            Route::Security => {
                let limit = req
                    .query_usize("limit")
                    .unwrap_or(defaults.default_security_limit);
                AdminResponse::ok(&self.store.security().query(limit))
            }
            Route::Logs => {
                let limit = req.query_usize("limit").unwrap_or(defaults.default_log_limit);
                AdminResponse::ok(&self.logs.recent(limit))
            }
            Route::DiskUsage => match self.disk.usage() {
                Ok(usage) => AdminResponse::ok(&usage),
                Err(e) => {
                    warn!(error = %e, "Disk usage unavailable");
                    AdminResponse::error(503, "Disk usage unavailable")
                }
            },
        }
    }

    fn strip_prefix<'a>(&self, path: &'a str) -> &'a str {
        if self.config.prefix.is_empty() {
            return path;
        }
        match path.strip_prefix(self.config.prefix.as_str()) {
            Some(rest) if rest.starts_with('/') => rest,
            _ => path,
        }
    }

    /// Registered route paths, without prefix
    pub fn routes(&self) -> Vec<&'static str> {
        vec![
            "/system-health",
            "/performance",
            "/database",
            "/security",
            "/logs",
            "/disk-usage",
        ]
    }

    pub fn store(&self) -> &Arc<TelemetryStore> {
        &self.store
    }
}
