//! Terminal renderings of the latest snapshots.

use std::io::Write;

use log::warn;
use serde_json::json;

use crate::features::process::ProcessSnapshot;
use crate::features::scheduled_task::TaskSnapshot;
use crate::features::service::ServiceSnapshot;
use crate::features::system_metrics::{bytes_to_gb, SystemSnapshot};
use crate::shared::error::QueryError;
use crate::shared::snapshot::{Snapshot, SnapshotKind};
use crate::shared::traits::Presenter;

/// Prints each snapshot as a plain text table.
pub struct TablePresenter<W: Write> {
    out: W,
    max_rows: usize,
}

impl<W: Write> TablePresenter<W> {
    /// `max_rows` caps the rows printed per table; 0 prints everything.
    pub fn new(out: W, max_rows: usize) -> Self {
        Self { out, max_rows }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn table(&mut self, title: &str, headers: &[&str], rows: Vec<Vec<String>>) {
        let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let shown = if self.max_rows == 0 { rows.len() } else { rows.len().min(self.max_rows) };
        let mut text = format!("== {} ({} rows) ==\n", title, rows.len());
        text.push_str(&format_row(headers.iter().map(|h| h.to_string()), &widths));
        for row in rows.into_iter().take(shown) {
            text.push_str(&format_row(row.into_iter(), &widths));
        }
        self.write(&text);
    }

    fn write(&mut self, text: &str) {
        if let Err(e) = self.out.write_all(text.as_bytes()).and_then(|_| self.out.flush()) {
            warn!("Failed to write to terminal: {}", e);
        }
    }
}

fn format_row(cells: impl Iterator<Item = String>, widths: &[usize]) -> String {
    let line = cells
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    format!("{}\n", line.trim_end())
}

fn megabytes(bytes: u64) -> String {
    format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
}

impl<W: Write> Presenter for TablePresenter<W> {
    fn show_system(&mut self, s: &SystemSnapshot) {
        let header = format!(
            "CPU: {} ({} cores), load {:.1}%\nRAM: {:.2} GB total, {:.2} GB used ({:.1}%)\n",
            s.cpu_name,
            s.cpu_core_count,
            s.cpu_load_percent,
            bytes_to_gb(s.ram_total),
            bytes_to_gb(s.ram_used),
            s.ram_used_percent(),
        );
        self.write(&header);
        let rows = s
            .disks
            .iter()
            .map(|d| {
                vec![
                    d.name.clone(),
                    d.filesystem.clone(),
                    format!("{} GB", d.total_gb),
                    format!("{} GB", d.used_gb),
                ]
            })
            .collect();
        self.table("Disks", &["Name", "File system", "Total", "Used"], rows);
    }

    fn show_processes(&mut self, s: &ProcessSnapshot) {
        let rows = s
            .entries
            .iter()
            .map(|p| vec![p.pid.to_string(), p.name.clone(), megabytes(p.memory_usage), p.status.clone()])
            .collect();
        self.write(&format!("Total memory: {}\n", megabytes(s.total_memory())));
        self.table("Processes", &["PID", "Name", "Memory", "Status"], rows);
    }

    fn show_services(&mut self, s: &ServiceSnapshot) {
        let rows = s
            .entries
            .iter()
            .map(|e| vec![e.name.clone(), e.state.clone()])
            .collect();
        self.write(&format!("Running: {}\n", s.count_in_state("running")));
        self.table("Services", &["Name", "State"], rows);
    }

    fn show_tasks(&mut self, s: &TaskSnapshot) {
        let rows = s
            .entries
            .iter()
            .map(|t| vec![t.name.clone(), t.next_run_time.clone(), t.state.clone(), t.path.clone()])
            .collect();
        self.table("Scheduled tasks", &["Name", "Next run", "State", "Path"], rows);
    }

    fn show_no_data(&mut self, kind: SnapshotKind, error: &QueryError) {
        self.write(&format!("== {kind}: no data this cycle ({error}) ==\n"));
    }
}

/// Prints one JSON object per notification.
pub struct JsonPresenter<W: Write> {
    out: W,
}

impl<W: Write> JsonPresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, value: serde_json::Value) {
        let result = serde_json::to_writer(&mut self.out, &value)
            .map_err(std::io::Error::from)
            .and_then(|_| self.out.write_all(b"\n"))
            .and_then(|_| self.out.flush());
        if let Err(e) = result {
            warn!("Failed to write JSON line: {}", e);
        }
    }

    fn emit_snapshot(&mut self, snapshot: Snapshot) {
        match serde_json::to_value(&snapshot) {
            Ok(value) => self.emit(value),
            Err(e) => warn!("Failed to serialize {} snapshot: {}", snapshot.kind(), e),
        }
    }
}

impl<W: Write> Presenter for JsonPresenter<W> {
    fn show_system(&mut self, s: &SystemSnapshot) {
        self.emit_snapshot(Snapshot::System(s.clone()));
    }

    fn show_processes(&mut self, s: &ProcessSnapshot) {
        self.emit_snapshot(Snapshot::Processes(s.clone()));
    }

    fn show_services(&mut self, s: &ServiceSnapshot) {
        self.emit_snapshot(Snapshot::Services(s.clone()));
    }

    fn show_tasks(&mut self, s: &TaskSnapshot) {
        self.emit_snapshot(Snapshot::Tasks(s.clone()));
    }

    fn show_no_data(&mut self, kind: SnapshotKind, error: &QueryError) {
        self.emit(json!({ "kind": kind, "error": error.to_string() }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::process::ProcessEntry;
    use crate::features::service::ServiceEntry;
    use crate::features::system_metrics::DiskEntry;

    fn services() -> ServiceSnapshot {
        ServiceSnapshot::new(vec![
            ServiceEntry { name: "cron".into(), state: "running".into() },
            ServiceEntry { name: "networkd".into(), state: "exited".into() },
            ServiceEntry { name: "sshd".into(), state: "running".into() },
        ])
    }

    #[test]
    fn table_aligns_columns_and_caps_rows() {
        let mut presenter = TablePresenter::new(Vec::new(), 2);
        presenter.show_services(&services());
        let text = String::from_utf8(presenter.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Running: 2");
        assert_eq!(lines[1], "== Services (3 rows) ==");
        assert_eq!(lines[2], "Name      State");
        assert_eq!(lines[3], "cron      running");
        assert_eq!(lines[4], "networkd  exited");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn processes_table_reports_total_memory() {
        let snapshot = ProcessSnapshot::new(vec![
            ProcessEntry { pid: 1, name: "init".into(), memory_usage: 1 << 20, status: "Sleep".into() },
            ProcessEntry { pid: 42, name: "sshd".into(), memory_usage: 3 << 20, status: "Run".into() },
        ]);
        let mut presenter = TablePresenter::new(Vec::new(), 0);
        presenter.show_processes(&snapshot);
        let text = String::from_utf8(presenter.into_inner()).unwrap();

        assert!(text.starts_with("Total memory: 4.0 MB\n"));
        assert!(text.contains("42   sshd  3.0 MB  Run"));
    }

    #[test]
    fn table_shows_system_summary_and_disks() {
        let snapshot = SystemSnapshot::builder()
            .cpu_name("Ryzen 7".to_string())
            .cpu_core_count(8)
            .cpu_load_percent(42.0)
            .ram_total(16 << 30)
            .ram_used(4 << 30)
            .disks(vec![DiskEntry {
                name: "C:\\".into(),
                filesystem: "NTFS".into(),
                total_gb: 476.34,
                used_gb: 210.5,
            }])
            .build()
            .unwrap();
        let mut presenter = TablePresenter::new(Vec::new(), 0);
        presenter.show_system(&snapshot);
        let text = String::from_utf8(presenter.into_inner()).unwrap();

        assert!(text.contains("CPU: Ryzen 7 (8 cores), load 42.0%"));
        assert!(text.contains("RAM: 16.00 GB total, 4.00 GB used (25.0%)"));
        assert!(text.contains("476.34 GB"));
    }

    #[test]
    fn no_data_is_visible() {
        let mut presenter = TablePresenter::new(Vec::new(), 0);
        presenter.show_no_data(SnapshotKind::Tasks, &QueryError::Unsupported("scheduled task listing"));
        let text = String::from_utf8(presenter.into_inner()).unwrap();
        assert!(text.contains("tasks: no data this cycle"));
    }

    #[test]
    fn json_lines_carry_kind() {
        let mut presenter = JsonPresenter::new(Vec::new());
        presenter.show_services(&services());
        presenter.show_no_data(SnapshotKind::Processes, &QueryError::Parse("bad".into()));
        let text = String::from_utf8(presenter.into_inner()).unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();

        assert_eq!(lines[0]["kind"], "services");
        assert_eq!(lines[0]["entries"][2]["name"], "sshd");
        assert_eq!(lines[1]["kind"], "processes");
        assert_eq!(lines[1]["error"], "Failed to parse output: bad");
    }
}
