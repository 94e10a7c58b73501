use crate::shared::command::run_tool;
use crate::shared::traits::SystemQuery;
use crate::shared::error::QueryError;
use crate::shared::snapshot::{Snapshot, SnapshotKind};
use crate::features::scheduled_task::models::{TaskEntry, TaskSnapshot};
use encoding_rs::Encoding;
use log::debug;
use which::which;

const NOT_SCHEDULED: &str = "n/a";

/// Scheduled tasks: Task Scheduler on Windows, systemd timers on Linux.
pub struct ScheduledTaskQuery {
    encoding: &'static Encoding,
}

impl ScheduledTaskQuery {
    pub fn new(encoding: &'static Encoding) -> Self {
        Self { encoding }
    }

    fn collect_tasks(&self) -> Result<Vec<TaskEntry>, QueryError> {
        if cfg!(target_os = "windows") {
            let output = run_tool("schtasks", ["/query", "/fo", "CSV", "/nh"], self.encoding)?;
            parse_schtasks_csv(&output)
        } else if cfg!(target_os = "linux") {
            let systemctl = which("systemctl").map_err(|e| QueryError::Command {
                command: "systemctl".to_string(),
                reason: e.to_string(),
            })?;
            let output = run_tool(
                systemctl,
                ["list-timers", "--all", "--no-pager", "--no-legend"],
                encoding_rs::UTF_8,
            )?;
            Ok(parse_systemd_timers(&output))
        } else {
            Err(QueryError::Unsupported("scheduled task listing"))
        }
    }
}

/// Parses `schtasks /query /fo CSV /nh`: "TaskName","Next Run Time","Status".
pub fn parse_schtasks_csv(output: &str) -> Result<Vec<TaskEntry>, QueryError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(output.as_bytes());

    let mut tasks = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| QueryError::Parse(e.to_string()))?;
        if record.len() < 3 {
            continue;
        }
        let path = record[0].trim();
        // Header rows repeat per folder and INFO lines carry no path.
        if !path.starts_with('\\') {
            continue;
        }
        let name = path.rsplit('\\').next().unwrap_or(path);
        tasks.push(TaskEntry {
            name: name.to_string(),
            path: path.to_string(),
            state: record[2].trim().to_string(),
            next_run_time: record[1].trim().to_string(),
        });
    }
    Ok(tasks)
}

/// Parses `systemctl list-timers --no-legend`: NEXT LEFT LAST PASSED UNIT ACTIVATES.
///
/// NEXT is four tokens (`Mon 2026-10-19 00:00:00 UTC`) or a single `n/a` / `-`.
pub fn parse_systemd_timers(output: &str) -> Vec<TaskEntry> {
    output
        .lines()
        .filter_map(|line| {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            let unit_at = tokens.iter().position(|t| t.ends_with(".timer"))?;
            let unit = tokens[unit_at];

            let scheduled = !matches!(tokens.first(), Some(&"n/a") | Some(&"-"));
            let next_run_time = if scheduled && unit_at >= 4 {
                tokens[..4].join(" ")
            } else {
                NOT_SCHEDULED.to_string()
            };

            Some(TaskEntry {
                name: unit.trim_end_matches(".timer").to_string(),
                path: tokens.get(unit_at + 1).copied().unwrap_or(unit).to_string(),
                state: if scheduled { "waiting" } else { "inactive" }.to_string(),
                next_run_time,
            })
        })
        .collect()
}

impl SystemQuery for ScheduledTaskQuery {
    fn kind(&self) -> SnapshotKind {
        SnapshotKind::Tasks
    }

    fn query(&mut self) -> Result<Snapshot, QueryError> {
        let tasks = self.collect_tasks()?;
        debug!("Collected information for {} scheduled tasks", tasks.len());
        Ok(Snapshot::Tasks(TaskSnapshot::new(tasks)))
    }

    fn health_check(&self) -> Result<(), QueryError> {
        let tool = if cfg!(target_os = "windows") {
            "schtasks"
        } else if cfg!(target_os = "linux") {
            "systemctl"
        } else {
            return Err(QueryError::Unsupported("scheduled task listing"));
        };
        which(tool)
            .map(|_| ())
            .map_err(|_| QueryError::Unsupported("task scheduler tool not found"))
    }
}
