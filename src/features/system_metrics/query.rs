use crate::shared::traits::SystemQuery;
use crate::shared::error::QueryError;
use crate::shared::snapshot::{Snapshot, SnapshotKind};
use crate::features::system_metrics::models::{bytes_to_gb, DiskEntry, SystemSnapshot};
use log::debug;
use sysinfo::{Disks, System};

/// CPU, memory and disk usage via sysinfo.
pub struct SystemMetricsQuery {
    sys: System,
}

impl SystemMetricsQuery {
    pub fn new() -> Self {
        let mut sys = System::new();
        // Primes the CPU counters so the first cycle reports a real load.
        sys.refresh_all();
        Self { sys }
    }

    fn cpu_name(&self) -> String {
        self.sys
            .cpus()
            .first()
            .map(|cpu| cpu.brand().trim().to_string())
            .filter(|brand| !brand.is_empty())
            .unwrap_or_else(|| String::from("unknown"))
    }

    fn cpu_load(&self) -> f32 {
        let load = self.sys.global_cpu_usage();
        if load.is_finite() {
            load.clamp(0.0, 100.0)
        } else {
            0.0
        }
    }

    fn collect_disks(&self) -> Vec<DiskEntry> {
        let disks = Disks::new_with_refreshed_list();
        let entries: Vec<DiskEntry> = disks
            .list()
            .iter()
            .map(|disk| {
                let total = disk.total_space();
                let used = total.saturating_sub(disk.available_space());
                DiskEntry {
                    name: disk_label(
                        &disk.name().to_string_lossy(),
                        &disk.mount_point().to_string_lossy(),
                    ),
                    filesystem: disk.file_system().to_string_lossy().into_owned(),
                    total_gb: bytes_to_gb(total),
                    used_gb: bytes_to_gb(used),
                }
            })
            .collect();

        debug!("Found {} disks", entries.len());
        entries
    }
}

/// Windows reports drives by mount point ("C:\"), unix by device name.
fn disk_label(name: &str, mount_point: &str) -> String {
    if cfg!(target_os = "windows") || name.is_empty() {
        mount_point.to_string()
    } else {
        format!("{name} ({mount_point})")
    }
}

impl SystemQuery for SystemMetricsQuery {
    fn kind(&self) -> SnapshotKind {
        SnapshotKind::System
    }

    fn query(&mut self) -> Result<Snapshot, QueryError> {
        self.sys.refresh_all();

        let snapshot = SystemSnapshot::builder()
            .cpu_name(self.cpu_name())
            .cpu_core_count(self.sys.cpus().len())
            .cpu_load_percent(self.cpu_load())
            .ram_total(self.sys.total_memory())
            .ram_used(self.sys.used_memory().min(self.sys.total_memory()))
            .disks(self.collect_disks())
            .build()
            .map_err(QueryError::Invalid)?;

        Ok(Snapshot::System(snapshot))
    }

    fn health_check(&self) -> Result<(), QueryError> {
        if self.sys.cpus().is_empty() {
            return Err(QueryError::Unsupported("no CPU information available"));
        }
        Ok(())
    }
}

impl Default for SystemMetricsQuery {
    fn default() -> Self {
        Self::new()
    }
}
