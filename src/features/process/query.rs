use crate::shared::traits::SystemQuery;
use crate::shared::error::QueryError;
use crate::shared::snapshot::{Snapshot, SnapshotKind};
use crate::features::process::models::{ProcessEntry, ProcessSnapshot};
use log::debug;
use sysinfo::System;

/// Running processes via sysinfo.
pub struct ProcessQuery {
    sys: System,
}

impl ProcessQuery {
    pub fn new() -> Self {
        let mut sys = System::new();
        sys.refresh_all();
        Self { sys }
    }

    fn collect_processes(&mut self) -> Vec<ProcessEntry> {
        self.sys.refresh_all();

        let mut entries: Vec<ProcessEntry> = self
            .sys
            .processes()
            .iter()
            .map(|(pid, process)| ProcessEntry {
                pid: pid.as_u32(),
                name: display_name(&process.name().to_string_lossy(), pid.as_u32()),
                memory_usage: process.memory(),
                status: format!("{:?}", process.status()),
            })
            .collect();

        // The process table is a hash map; give rows a stable order.
        entries.sort_by_key(|p| p.pid);
        entries
    }
}

/// Kernel threads and zombies can report an empty name.
fn display_name(name: &str, pid: u32) -> String {
    if name.is_empty() {
        format!("<pid {pid}>")
    } else {
        name.to_string()
    }
}

impl SystemQuery for ProcessQuery {
    fn kind(&self) -> SnapshotKind {
        SnapshotKind::Processes
    }

    fn query(&mut self) -> Result<Snapshot, QueryError> {
        let entries = self.collect_processes();
        if entries.is_empty() {
            return Err(QueryError::Unsupported("process table is not readable"));
        }
        debug!("Collected information for {} processes", entries.len());
        Ok(Snapshot::Processes(ProcessSnapshot::new(entries)))
    }

    fn health_check(&self) -> Result<(), QueryError> {
        if self.sys.processes().is_empty() {
            return Err(QueryError::Unsupported("no processes available"));
        }
        Ok(())
    }
}

impl Default for ProcessQuery {
    fn default() -> Self {
        Self::new()
    }
}
