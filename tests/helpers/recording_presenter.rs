use std::time::Duration;

use sysview::{
    ProcessSnapshot, Presenter, QueryError, ServiceSnapshot, SnapshotKind, SystemSnapshot,
    TaskSnapshot,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Seen {
    System,
    Processes,
    Services(String),
    Tasks(String),
    NoData(SnapshotKind),
}

/// Records what it was asked to show, optionally taking `delay` per call.
#[derive(Default)]
pub struct RecordingPresenter {
    pub seen: Vec<Seen>,
    pub delay: Duration,
}

impl RecordingPresenter {
    pub fn slow(delay: Duration) -> Self {
        Self {
            seen: Vec::new(),
            delay,
        }
    }

    pub fn count(&self, pred: impl Fn(&Seen) -> bool) -> usize {
        self.seen.iter().filter(|s| pred(s)).count()
    }

    fn record(&mut self, seen: Seen) {
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        self.seen.push(seen);
    }
}

impl Presenter for RecordingPresenter {
    fn show_system(&mut self, _snapshot: &SystemSnapshot) {
        self.record(Seen::System);
    }

    fn show_processes(&mut self, _snapshot: &ProcessSnapshot) {
        self.record(Seen::Processes);
    }

    fn show_services(&mut self, snapshot: &ServiceSnapshot) {
        let first = snapshot.entries.first().map(|e| e.name.clone()).unwrap_or_default();
        self.record(Seen::Services(first));
    }

    fn show_tasks(&mut self, snapshot: &TaskSnapshot) {
        let first = snapshot.entries.first().map(|e| e.name.clone()).unwrap_or_default();
        self.record(Seen::Tasks(first));
    }

    fn show_no_data(&mut self, kind: SnapshotKind, _error: &QueryError) {
        self.record(Seen::NoData(kind));
    }
}
