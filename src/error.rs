//! Error Types
//!
//! Failures surfaced by query operations. Recording operations never fail.

use thiserror::Error;

/// Errors reported by the storage collaborator
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("storage probe timed out after {0} ms")]
    Timeout(u64),

    #[error("unknown table: {0}")]
    UnknownTable(String),
}

/// Errors reported by telemetry queries
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Process or host introspection failed
    #[error("process introspection failed: {0}")]
    Introspection(String),

    /// No disk matches the configured path
    #[error("no disk found for path {0}")]
    DiskUnavailable(String),
}

pub type Result<T> = std::result::Result<T, TelemetryError>;
