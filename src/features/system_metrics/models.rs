use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::shared::traits::Validatable;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskEntry {
    pub name: String,
    pub filesystem: String,
    pub total_gb: f64,
    pub used_gb: f64,
}

/// CPU, RAM and disk usage at one instant. RAM figures are bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemSnapshot {
    pub taken_at: DateTime<Utc>,
    pub cpu_name: String,
    pub cpu_core_count: usize,
    pub cpu_load_percent: f32,
    pub ram_total: u64,
    pub ram_used: u64,
    pub disks: Vec<DiskEntry>,
}

impl SystemSnapshot {
    pub fn builder() -> SystemSnapshotBuilder {
        SystemSnapshotBuilder::new()
    }

    pub fn ram_used_percent(&self) -> f64 {
        if self.ram_total == 0 {
            return 0.0;
        }
        self.ram_used as f64 / self.ram_total as f64 * 100.0
    }
}

impl Validatable for SystemSnapshot {
    fn validate(&self) -> Result<(), String> {
        if self.cpu_core_count == 0 {
            return Err("CPU cores cannot be zero".to_string());
        }
        if !(0.0..=100.0).contains(&self.cpu_load_percent) {
            return Err("CPU load must be between 0 and 100".to_string());
        }
        if self.ram_used > self.ram_total {
            return Err("Used memory cannot exceed total memory".to_string());
        }
        for disk in &self.disks {
            if disk.used_gb > disk.total_gb {
                return Err(format!("Used space cannot exceed total space for disk {}", disk.name));
            }
        }
        Ok(())
    }
}

/// Rounds a byte count to gigabytes with two decimals.
pub fn bytes_to_gb(bytes: u64) -> f64 {
    const GB: f64 = 1024.0 * 1024.0 * 1024.0;
    (bytes as f64 / GB * 100.0).round() / 100.0
}

#[derive(Default)]
pub struct SystemSnapshotBuilder {
    taken_at: Option<DateTime<Utc>>,
    cpu_name: Option<String>,
    cpu_core_count: Option<usize>,
    cpu_load_percent: Option<f32>,
    ram_total: Option<u64>,
    ram_used: Option<u64>,
    disks: Option<Vec<DiskEntry>>,
}

impl SystemSnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn taken_at(mut self, taken_at: DateTime<Utc>) -> Self {
        self.taken_at = Some(taken_at);
        self
    }

    pub fn cpu_name(mut self, cpu_name: String) -> Self {
        self.cpu_name = Some(cpu_name);
        self
    }

    pub fn cpu_core_count(mut self, cpu_core_count: usize) -> Self {
        self.cpu_core_count = Some(cpu_core_count);
        self
    }

    pub fn cpu_load_percent(mut self, cpu_load_percent: f32) -> Self {
        self.cpu_load_percent = Some(cpu_load_percent);
        self
    }

    pub fn ram_total(mut self, ram_total: u64) -> Self {
        self.ram_total = Some(ram_total);
        self
    }

    pub fn ram_used(mut self, ram_used: u64) -> Self {
        self.ram_used = Some(ram_used);
        self
    }

    pub fn disks(mut self, disks: Vec<DiskEntry>) -> Self {
        self.disks = Some(disks);
        self
    }

    pub fn build(self) -> Result<SystemSnapshot, String> {
        let snapshot = SystemSnapshot {
            taken_at: self.taken_at.unwrap_or_else(Utc::now),
            cpu_name: self.cpu_name.ok_or("cpu_name is required")?,
            cpu_core_count: self.cpu_core_count.ok_or("cpu_core_count is required")?,
            cpu_load_percent: self.cpu_load_percent.ok_or("cpu_load_percent is required")?,
            ram_total: self.ram_total.ok_or("ram_total is required")?,
            ram_used: self.ram_used.ok_or("ram_used is required")?,
            disks: self.disks.unwrap_or_default(),
        };

        snapshot.validate()?;
        Ok(snapshot)
    }
}
