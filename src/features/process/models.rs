use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::shared::traits::Validatable;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessEntry {
    pub pid: u32,
    pub name: String,
    /// Resident memory in bytes.
    pub memory_usage: u64,
    pub status: String,
}

/// Running processes, one row each, ordered by pid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessSnapshot {
    pub taken_at: DateTime<Utc>,
    pub entries: Vec<ProcessEntry>,
}

impl ProcessSnapshot {
    pub fn new(entries: Vec<ProcessEntry>) -> Self {
        Self {
            taken_at: Utc::now(),
            entries,
        }
    }

    pub fn total_memory(&self) -> u64 {
        self.entries.iter().map(|p| p.memory_usage).sum()
    }
}

impl Validatable for ProcessEntry {
    fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err(format!("Process {} has an empty name", self.pid));
        }
        if self.status.is_empty() {
            return Err(format!("Process {} has an empty status", self.name));
        }
        Ok(())
    }
}

impl Validatable for ProcessSnapshot {
    fn validate(&self) -> Result<(), String> {
        self.entries.iter().try_for_each(Validatable::validate)
    }
}
