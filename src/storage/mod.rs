//! Storage Collaborator
//!
//! The storage engine itself lives elsewhere; telemetry only needs a health
//! probe and per-table row counts.

mod memory;
mod table_metrics;

pub use memory::MemoryStorage;
pub use table_metrics::{DatabaseMetricsProbe, TableMetrics};

use crate::error::StorageError;
use async_trait::async_trait;

/// Operations consumed from the storage engine
#[async_trait]
pub trait StorageProbe: Send + Sync {
    /// Open or validate a connection
    async fn health_check(&self) -> Result<(), StorageError>;

    /// Row count for a table
    async fn count(&self, table: &str) -> Result<u64, StorageError>;
}
