//! Disk Usage
//!
//! Filesystem usage for the disk holding a configured path.

use super::snapshot::DiskUsage;
use crate::error::{Result, TelemetryError};
use crate::telemetry::round2;
use std::path::{Path, PathBuf};
use sysinfo::Disks;

pub struct DiskUsageProbe {
    path: PathBuf,
}

impl DiskUsageProbe {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Usage of the disk whose mount point is the longest prefix of the path
    pub fn usage(&self) -> Result<DiskUsage> {
        let disks = Disks::new_with_refreshed_list();

        let disk = disks
            .list()
            .iter()
            .filter(|d| self.path.starts_with(d.mount_point()))
            .max_by_key(|d| d.mount_point().as_os_str().len())
            .ok_or_else(|| TelemetryError::DiskUnavailable(self.path.display().to_string()))?;

        Ok(compute_usage(disk.total_space(), disk.available_space()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

pub(crate) fn compute_usage(total: u64, available: u64) -> DiskUsage {
    let free = available.min(total);
    let used = total - free;
    let percentage = if total == 0 {
        0.0
    } else {
        round2(used as f64 / total as f64 * 100.0)
    };

    DiskUsage {
        total,
        used,
        free,
        percentage,
    }
}
