use crate::shared::command::run_tool;
use crate::shared::traits::SystemQuery;
use crate::shared::error::QueryError;
use crate::shared::snapshot::{Snapshot, SnapshotKind};
use crate::features::service::models::{ServiceEntry, ServiceSnapshot};
use encoding_rs::Encoding;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use which::which;

static SERVICE_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*SERVICE_NAME:\s*(.+)$").expect("valid regex"));
static STATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*STATE\s*:\s*\d+\s+(\S+)").expect("valid regex"));

/// Running services: `sc query` on Windows, systemd units on Linux.
pub struct ServiceQuery {
    encoding: &'static Encoding,
}

impl ServiceQuery {
    /// `encoding` decodes the console output of the Windows tools.
    pub fn new(encoding: &'static Encoding) -> Self {
        Self { encoding }
    }

    fn collect_services(&self) -> Result<Vec<ServiceEntry>, QueryError> {
        if cfg!(target_os = "windows") {
            let output = run_tool("sc", ["query"], self.encoding)?;
            Ok(parse_sc_query(&output))
        } else if cfg!(target_os = "linux") {
            let systemctl = which("systemctl").map_err(|e| QueryError::Command {
                command: "systemctl".to_string(),
                reason: e.to_string(),
            })?;
            let output = run_tool(
                systemctl,
                ["list-units", "--type=service", "--all", "--no-pager", "--plain", "--no-legend"],
                encoding_rs::UTF_8,
            )?;
            Ok(parse_systemctl_units(&output))
        } else {
            Err(QueryError::Unsupported("service listing"))
        }
    }
}

/// Parses the block output of `sc query`.
pub fn parse_sc_query(output: &str) -> Vec<ServiceEntry> {
    let mut services = Vec::new();
    let mut current: Option<ServiceEntry> = None;

    for line in output.lines() {
        if let Some(cap) = SERVICE_NAME_RE.captures(line) {
            if let Some(service) = current.take() {
                services.push(service);
            }
            current = Some(ServiceEntry {
                name: cap[1].trim().to_string(),
                state: String::from("UNKNOWN"),
            });
        } else if let Some(cap) = STATE_RE.captures(line) {
            if let Some(service) = current.as_mut() {
                service.state = cap[1].trim().to_string();
            }
        }
    }

    if let Some(service) = current {
        services.push(service);
    }
    services
}

/// Parses `systemctl list-units --plain --no-legend` rows: UNIT LOAD ACTIVE SUB DESCRIPTION.
pub fn parse_systemctl_units(output: &str) -> Vec<ServiceEntry> {
    output
        .lines()
        .filter_map(|line| {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 4 || !parts[0].ends_with(".service") {
                return None;
            }
            Some(ServiceEntry {
                name: parts[0].trim_end_matches(".service").to_string(),
                state: parts[3].to_string(),
            })
        })
        .collect()
}

impl SystemQuery for ServiceQuery {
    fn kind(&self) -> SnapshotKind {
        SnapshotKind::Services
    }

    fn query(&mut self) -> Result<Snapshot, QueryError> {
        let services = self.collect_services()?;
        debug!("Collected information for {} services", services.len());
        Ok(Snapshot::Services(ServiceSnapshot::new(services)))
    }

    fn health_check(&self) -> Result<(), QueryError> {
        if cfg!(target_os = "windows") {
            if which("sc").is_err() {
                return Err(QueryError::Unsupported("sc command not found"));
            }
        } else if cfg!(target_os = "linux") {
            if which("systemctl").is_err() {
                return Err(QueryError::Unsupported("systemctl command not found"));
            }
        } else {
            return Err(QueryError::Unsupported("service listing"));
        }
        Ok(())
    }
}
