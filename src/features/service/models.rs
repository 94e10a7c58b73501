use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::shared::traits::Validatable;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceEntry {
    pub name: String,
    pub state: String,
}

/// Services in the order the service manager lists them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceSnapshot {
    pub taken_at: DateTime<Utc>,
    pub entries: Vec<ServiceEntry>,
}

impl ServiceSnapshot {
    pub fn new(entries: Vec<ServiceEntry>) -> Self {
        Self {
            taken_at: Utc::now(),
            entries,
        }
    }

    pub fn count_in_state(&self, state: &str) -> usize {
        self.entries
            .iter()
            .filter(|s| s.state.eq_ignore_ascii_case(state))
            .count()
    }
}

impl Validatable for ServiceSnapshot {
    fn validate(&self) -> Result<(), String> {
        for service in &self.entries {
            if service.name.is_empty() {
                return Err("Service name cannot be empty".to_string());
            }
            if service.state.is_empty() {
                return Err(format!("Status of service {} cannot be empty", service.name));
            }
        }
        Ok(())
    }
}
