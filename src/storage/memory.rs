//! In-Memory Storage
//!
//! Process-local stand-in for the storage engine, backed by DashMap.

use super::StorageProbe;
use crate::error::StorageError;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Table name -> row count, with switchable availability and latency
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    tables: Arc<DashMap<String, u64>>,
    available: Arc<AtomicBool>,
    latency_ms: Arc<AtomicU64>,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            tables: Arc::new(DashMap::new()),
            available: Arc::new(AtomicBool::new(true)),
            latency_ms: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Create with the given tables, all empty
    pub fn with_tables<I, S>(tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let storage = Self::new();
        for table in tables {
            storage.tables.insert(table.into(), 0);
        }
        storage
    }

    /// Set a table's row count, creating the table if needed
    pub fn set_rows(&self, table: &str, rows: u64) {
        self.tables.insert(table.to_string(), rows);
    }

    /// Add rows to a table, returns the new count
    pub fn insert_rows(&self, table: &str, rows: u64) -> u64 {
        let mut entry = self.tables.entry(table.to_string()).or_insert(0);
        *entry = entry.saturating_add(rows);
        *entry
    }

    pub fn drop_table(&self, table: &str) -> bool {
        self.tables.remove(table).is_some()
    }

    /// Simulate an outage
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::Relaxed);
    }

    /// Delay every call by `latency`
    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms
            .store(latency.as_millis() as u64, Ordering::Relaxed);
    }

    async fn simulate(&self) -> Result<(), StorageError> {
        let latency = self.latency_ms.load(Ordering::Relaxed);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }
        if !self.available.load(Ordering::Relaxed) {
            return Err(StorageError::Unavailable("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl StorageProbe for MemoryStorage {
    async fn health_check(&self) -> Result<(), StorageError> {
        self.simulate().await
    }

    async fn count(&self, table: &str) -> Result<u64, StorageError> {
        self.simulate().await?;
        self.tables
            .get(table)
            .map(|rows| *rows)
            .ok_or_else(|| StorageError::UnknownTable(table.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_counts() {
        let storage = MemoryStorage::with_tables(["users"]);
        storage.insert_rows("users", 3);
        storage.insert_rows("users", 2);
        storage.set_rows("files", 9);

        assert_eq!(storage.count("users").await, Ok(5));
        assert_eq!(storage.count("files").await, Ok(9));
        assert_eq!(
            storage.count("missing").await,
            Err(StorageError::UnknownTable("missing".to_string()))
        );
    }

    #[tokio::test]
    async fn test_outage() {
        let storage = MemoryStorage::new();
        assert!(storage.health_check().await.is_ok());

        storage.set_available(false);
        assert!(matches!(
            storage.health_check().await,
            Err(StorageError::Unavailable(_))
        ));

        assert!(!storage.drop_table("nothing"));
    }
}
