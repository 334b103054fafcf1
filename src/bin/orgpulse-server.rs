//! ORGPULSE Server Binary
//!
//! Runs the admin monitoring API over an in-process telemetry store.

use clap::Parser;
use orgpulse::{
    AdminApi, AdminConfig, AdminServer, LogBuffer, MemoryStorage, ServerConfig, TelemetryConfig,
    TelemetryStore,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// ORGPULSE Server - Operational telemetry admin API
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Bind address
    #[arg(short, long, env = "ORGPULSE_BIND", default_value = "0.0.0.0")]
    bind: String,

    /// Port number
    #[arg(short, long, env = "ORGPULSE_PORT", default_value_t = 8088)]
    port: u16,

    /// Path prefix for admin routes
    #[arg(long, env = "ORGPULSE_PREFIX", default_value = "/admin")]
    prefix: String,

    /// Maximum number of distinct endpoints tracked (0 = unlimited)
    #[arg(long, env = "ORGPULSE_MAX_ENDPOINTS", default_value_t = 500)]
    max_endpoints: usize,

    /// Maximum number of retained security events
    #[arg(long, env = "ORGPULSE_MAX_SECURITY_EVENTS", default_value_t = 1000)]
    max_security_events: usize,

    /// Storage health probe timeout in milliseconds
    #[arg(long, env = "ORGPULSE_PROBE_TIMEOUT_MS", default_value_t = 5000)]
    probe_timeout_ms: u64,

    /// Close keep-alive connections idle for this many seconds
    #[arg(long, env = "ORGPULSE_IDLE_TIMEOUT_SECS", default_value_t = 60)]
    idle_timeout_secs: u64,

    /// Key endpoints on raw paths instead of route templates
    #[arg(long)]
    raw_paths: bool,

    /// Path whose filesystem is reported by disk-usage
    #[arg(long, default_value = "/")]
    disk_path: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = TelemetryConfig::default()
        .with_max_endpoints(args.max_endpoints)
        .with_max_security_events(args.max_security_events)
        .with_probe_timeout(Duration::from_millis(args.probe_timeout_ms))
        .with_normalize_paths(!args.raw_paths)
        .with_disk_path(&args.disk_path);

    // Initialize logging
    let logs = LogBuffer::new(config.log_buffer_capacity);
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("orgpulse=info".parse()?))
        .with(fmt::layer())
        .with(logs.layer())
        .init();

    let storage = Arc::new(MemoryStorage::with_tables(config.tracked_tables.clone()));
    let store = Arc::new(TelemetryStore::new(config));
    let api = AdminApi::new(
        AdminConfig::default().with_prefix(&args.prefix),
        store,
        storage,
        logs,
    );

    let server_config = ServerConfig::default()
        .with_bind(&args.bind)
        .with_port(args.port)
        .with_idle_timeout(Duration::from_secs(args.idle_timeout_secs));

    info!(
        "Starting ORGPULSE admin server on {} (max endpoints {}, max security events {})",
        server_config.address(),
        args.max_endpoints,
        args.max_security_events
    );

    AdminServer::new(server_config, api).run().await?;

    Ok(())
}
