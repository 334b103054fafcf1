//! Health Module
//!
//! Process introspection, disk usage and system health snapshots.

mod builder;
mod disk;
mod process;
mod snapshot;

pub use builder::HealthSnapshotBuilder;
pub use disk::DiskUsageProbe;
pub use process::{ProcessInspector, ProcessSample};
pub use snapshot::{
    ApiHealth, CpuUsage, DatabaseHealth, DiskUsage, HealthStatus, MemoryUsage, RuntimeIdentity,
    SecurityHealth, ServerHealth, SystemHealthSnapshot,
};
