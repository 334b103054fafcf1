//! Telemetry Configuration

use std::time::Duration;

/// Tables reported by the database metrics probe
pub const DEFAULT_TRACKED_TABLES: &[&str] = &[
    "users",
    "companies",
    "content",
    "reactions",
    "connections",
    "files",
];

/// Telemetry configuration
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Maximum number of retained security events
    pub max_security_events: usize,

    /// Maximum number of distinct endpoint keys (0 = unlimited)
    pub max_endpoints: usize,

    /// Collapse identifier-like path segments into `:id`
    pub normalize_paths: bool,

    /// Average response time above which an endpoint counts as slow
    pub slow_threshold_ms: f64,

    /// Upper bound on the storage health probe
    pub probe_timeout: Duration,

    /// Tables reported by the database metrics probe
    pub tracked_tables: Vec<String>,

    /// Default number of security events returned by a query
    pub default_security_limit: usize,

    /// Default number of log entries returned by a query
    pub default_log_limit: usize,

    /// Number of log entries kept in memory
    pub log_buffer_capacity: usize,

    /// Path whose filesystem is reported by the disk usage probe
    pub disk_path: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            max_security_events: 1000,
            max_endpoints: 500,
            normalize_paths: true,
            slow_threshold_ms: 1000.0,
            probe_timeout: Duration::from_secs(5),
            tracked_tables: DEFAULT_TRACKED_TABLES
                .iter()
                .map(|t| t.to_string())
                .collect(),
            default_security_limit: 50,
            default_log_limit: 100,
            log_buffer_capacity: 1000,
            disk_path: "/".to_string(),
        }
    }
}

impl TelemetryConfig {
    pub fn with_max_security_events(mut self, max: usize) -> Self {
        self.max_security_events = max;
        self
    }

    pub fn with_max_endpoints(mut self, max: usize) -> Self {
        self.max_endpoints = max;
        self
    }

    pub fn with_normalize_paths(mut self, normalize: bool) -> Self {
        self.normalize_paths = normalize;
        self
    }

    pub fn with_slow_threshold_ms(mut self, threshold: f64) -> Self {
        self.slow_threshold_ms = threshold;
        self
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub fn with_tracked_tables<I, S>(mut self, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tracked_tables = tables.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_disk_path(mut self, path: impl Into<String>) -> Self {
        self.disk_path = path.into();
        self
    }
}
