//! Process Introspection
//!
//! Memory, load and runtime identity of the current process via sysinfo.

use super::snapshot::{CpuUsage, MemoryUsage, RuntimeIdentity};
use crate::error::{Result, TelemetryError};
use parking_lot::Mutex;
use sysinfo::{MemoryRefreshKind, Pid, ProcessRefreshKind, ProcessesToUpdate, RefreshKind, System};

/// One reading of process resources
#[derive(Debug, Clone)]
pub struct ProcessSample {
    pub memory: MemoryUsage,
    pub cpu: CpuUsage,
    pub runtime: RuntimeIdentity,
}

/// Samples the current process on demand
pub struct ProcessInspector {
    system: Mutex<System>,
    pid: Option<Pid>,
}

impl Default for ProcessInspector {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessInspector {
    pub fn new() -> Self {
        let system = System::new_with_specifics(
            RefreshKind::nothing()
                .with_processes(ProcessRefreshKind::everything())
                .with_memory(MemoryRefreshKind::everything()),
        );

        Self {
            system: Mutex::new(system),
            pid: sysinfo::get_current_pid().ok(),
        }
    }

    /// Refresh and read this process's resources
    pub fn sample(&self) -> Result<ProcessSample> {
        let pid = self.pid.ok_or_else(|| {
            TelemetryError::Introspection("current pid unavailable".to_string())
        })?;

        let mut system = self.system.lock();
        system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
        system.refresh_memory();

        let process = system.process(pid).ok_or_else(|| {
            TelemetryError::Introspection(format!("process {} not found", pid))
        })?;

        let load = System::load_average();

        Ok(ProcessSample {
            memory: MemoryUsage {
                rss: process.memory(),
                virtual_memory: process.virtual_memory(),
                system_total: system.total_memory(),
                system_used: system.used_memory(),
            },
            cpu: CpuUsage {
                load_average: [load.one, load.five, load.fifteen],
                cores: num_cpus::get(),
            },
            runtime: RuntimeIdentity {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                os: System::long_os_version().unwrap_or_else(|| std::env::consts::OS.to_string()),
                arch: std::env::consts::ARCH.to_string(),
                pid: pid.as_u32(),
            },
        })
    }
}
