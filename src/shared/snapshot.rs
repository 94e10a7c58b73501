use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::features::process::ProcessSnapshot;
use crate::features::scheduled_task::TaskSnapshot;
use crate::features::service::ServiceSnapshot;
use crate::features::system_metrics::SystemSnapshot;
use crate::shared::error::QueryError;
use crate::shared::traits::Validatable;

/// The four kinds of data the viewer samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotKind {
    System,
    Processes,
    Services,
    Tasks,
}

impl SnapshotKind {
    pub const ALL: [SnapshotKind; 4] = [
        SnapshotKind::System,
        SnapshotKind::Processes,
        SnapshotKind::Services,
        SnapshotKind::Tasks,
    ];

    /// Stable slot index, used to address per-kind storage.
    pub fn index(self) -> usize {
        match self {
            SnapshotKind::System => 0,
            SnapshotKind::Processes => 1,
            SnapshotKind::Services => 2,
            SnapshotKind::Tasks => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SnapshotKind::System => "system",
            SnapshotKind::Processes => "processes",
            SnapshotKind::Services => "services",
            SnapshotKind::Tasks => "tasks",
        }
    }
}

impl fmt::Display for SnapshotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SnapshotKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "system" | "cpu" | "ram" | "disk" | "disks" => Ok(SnapshotKind::System),
            "processes" | "process" | "proc" => Ok(SnapshotKind::Processes),
            "services" | "service" => Ok(SnapshotKind::Services),
            "tasks" | "task" | "scheduler" => Ok(SnapshotKind::Tasks),
            other => Err(format!("unknown collector kind '{other}'")),
        }
    }
}

/// Result of one sampling cycle of one collector.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Snapshot {
    System(SystemSnapshot),
    Processes(ProcessSnapshot),
    Services(ServiceSnapshot),
    Tasks(TaskSnapshot),
}

impl Snapshot {
    pub fn kind(&self) -> SnapshotKind {
        match self {
            Snapshot::System(_) => SnapshotKind::System,
            Snapshot::Processes(_) => SnapshotKind::Processes,
            Snapshot::Services(_) => SnapshotKind::Services,
            Snapshot::Tasks(_) => SnapshotKind::Tasks,
        }
    }

    pub fn taken_at(&self) -> DateTime<Utc> {
        match self {
            Snapshot::System(s) => s.taken_at,
            Snapshot::Processes(s) => s.taken_at,
            Snapshot::Services(s) => s.taken_at,
            Snapshot::Tasks(s) => s.taken_at,
        }
    }

    /// Number of table rows this snapshot renders to.
    pub fn row_count(&self) -> usize {
        match self {
            Snapshot::System(s) => s.disks.len(),
            Snapshot::Processes(s) => s.entries.len(),
            Snapshot::Services(s) => s.entries.len(),
            Snapshot::Tasks(s) => s.entries.len(),
        }
    }
}

impl Validatable for Snapshot {
    fn validate(&self) -> Result<(), String> {
        match self {
            Snapshot::System(s) => s.validate(),
            Snapshot::Processes(s) => s.validate(),
            Snapshot::Services(s) => s.validate(),
            Snapshot::Tasks(s) => s.validate(),
        }
    }
}

impl From<SystemSnapshot> for Snapshot {
    fn from(s: SystemSnapshot) -> Self {
        Snapshot::System(s)
    }
}

impl From<ProcessSnapshot> for Snapshot {
    fn from(s: ProcessSnapshot) -> Self {
        Snapshot::Processes(s)
    }
}

impl From<ServiceSnapshot> for Snapshot {
    fn from(s: ServiceSnapshot) -> Self {
        Snapshot::Services(s)
    }
}

impl From<TaskSnapshot> for Snapshot {
    fn from(s: TaskSnapshot) -> Self {
        Snapshot::Tasks(s)
    }
}

/// What a collector hands to the presenter after each cycle.
#[derive(Debug)]
pub enum Notification {
    Snapshot(Snapshot),
    /// The cycle failed; the presenter should show "no data" instead of stale rows.
    NoData { kind: SnapshotKind, error: QueryError },
}

impl Notification {
    pub fn kind(&self) -> SnapshotKind {
        match self {
            Notification::Snapshot(snapshot) => snapshot.kind(),
            Notification::NoData { kind, .. } => *kind,
        }
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        match self {
            Notification::Snapshot(snapshot) => Some(snapshot),
            Notification::NoData { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&QueryError> {
        match self {
            Notification::Snapshot(_) => None,
            Notification::NoData { error, .. } => Some(error),
        }
    }
}
