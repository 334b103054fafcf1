//! Per-Table Metrics
//!
//! Best-effort row counts for a fixed list of tables.

use super::StorageProbe;
use crate::error::StorageError;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Metrics for one table. Size and index count are not measured by the
/// storage collaborator and are reported as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableMetrics {
    pub table_name: String,
    pub row_count: u64,
    pub size: Option<u64>,
    pub last_updated: DateTime<Utc>,
    pub index_count: Option<u32>,
}

/// Row count reporter over the storage collaborator
pub struct DatabaseMetricsProbe {
    storage: Arc<dyn StorageProbe>,
    tables: Vec<String>,
    timeout: Duration,
}

impl DatabaseMetricsProbe {
    pub fn new(storage: Arc<dyn StorageProbe>, tables: Vec<String>, timeout: Duration) -> Self {
        Self {
            storage,
            tables,
            timeout,
        }
    }

    /// Query every tracked table concurrently, each count bounded by the
    /// probe timeout. Tables whose count fails or times out are omitted.
    pub async fn collect(&self) -> Vec<TableMetrics> {
        let counts = join_all(self.tables.iter().map(|table| self.count_table(table))).await;

        self.tables
            .iter()
            .zip(counts)
            .filter_map(|(table, result)| match result {
                Ok(row_count) => Some(TableMetrics {
                    table_name: table.clone(),
                    row_count,
                    size: None,
                    last_updated: Utc::now(),
                    index_count: None,
                }),
                Err(e) => {
                    warn!(table = %table, error = %e, "Skipping table metrics");
                    None
                }
            })
            .collect()
    }

    async fn count_table(&self, table: &str) -> Result<u64, StorageError> {
        match tokio::time::timeout(self.timeout, self.storage.count(table)).await {
            Ok(result) => result,
            Err(_) => Err(StorageError::Timeout(self.timeout.as_millis() as u64)),
        }
    }

    pub fn tables(&self) -> &[String] {
        &self.tables
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use std::time::Instant;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn test_failing_table_is_omitted() {
        let storage = MemoryStorage::with_tables(["users", "companies"]);
        storage.set_rows("users", 12);
        storage.set_rows("companies", 3);

        let probe = DatabaseMetricsProbe::new(
            Arc::new(storage),
            vec!["users".into(), "reactions".into(), "companies".into()],
            TIMEOUT,
        );
        let metrics = probe.collect().await;

        let names: Vec<&str> = metrics.iter().map(|m| m.table_name.as_str()).collect();
        assert_eq!(names, vec!["users", "companies"]);
        assert_eq!(metrics[0].row_count, 12);
        assert_eq!(metrics[0].size, None);
    }

    #[tokio::test]
    async fn test_outage_yields_empty_list() {
        let storage = MemoryStorage::with_tables(["users"]);
        storage.set_available(false);

        let probe = DatabaseMetricsProbe::new(Arc::new(storage), vec!["users".into()], TIMEOUT);
        assert!(probe.collect().await.is_empty());
    }

    #[tokio::test]
    async fn test_slow_tables_are_omitted_within_timeout() {
        let tables = ["users", "companies", "content", "reactions", "connections", "files"];
        let storage = MemoryStorage::with_tables(tables);
        storage.set_latency(Duration::from_millis(300));

        let probe = DatabaseMetricsProbe::new(
            Arc::new(storage),
            tables.iter().map(|t| t.to_string()).collect(),
            Duration::from_millis(50),
        );

        let start = Instant::now();
        let metrics = probe.collect().await;
        let elapsed = start.elapsed();

        assert!(metrics.is_empty());
        assert!(elapsed < Duration::from_millis(250), "took {:?}", elapsed);
    }

    #[tokio::test]
    async fn test_count_timeout_error() {
        let storage = MemoryStorage::with_tables(["users"]);
        storage.set_latency(Duration::from_millis(200));

        let probe = DatabaseMetricsProbe::new(
            Arc::new(storage),
            vec!["users".into()],
            Duration::from_millis(20),
        );
        assert_eq!(
            probe.count_table("users").await,
            Err(StorageError::Timeout(20))
        );
    }

    #[test]
    fn test_serialized_shape() {
        let metrics = TableMetrics {
            table_name: "files".into(),
            row_count: 4,
            size: None,
            last_updated: Utc::now(),
            index_count: None,
        };
        let json = serde_json::to_value(&metrics).unwrap();
        assert_eq!(json["tableName"], "files");
        assert_eq!(json["rowCount"], 4);
        assert!(json["size"].is_null());
        assert!(json["indexCount"].is_null());
    }
}
