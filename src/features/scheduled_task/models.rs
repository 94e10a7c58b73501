use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::shared::traits::Validatable;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskEntry {
    pub name: String,
    /// Full location of the task in the scheduler (folder path or activated unit).
    pub path: String,
    pub state: String,
    /// As printed by the scheduler; "n/a" when the task is not scheduled.
    pub next_run_time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSnapshot {
    pub taken_at: DateTime<Utc>,
    pub entries: Vec<TaskEntry>,
}

impl TaskSnapshot {
    pub fn new(entries: Vec<TaskEntry>) -> Self {
        Self {
            taken_at: Utc::now(),
            entries,
        }
    }
}

impl Validatable for TaskSnapshot {
    fn validate(&self) -> Result<(), String> {
        if let Some(task) = self.entries.iter().find(|t| t.name.is_empty()) {
            return Err(format!("Task at '{}' has an empty name", task.path));
        }
        Ok(())
    }
}
