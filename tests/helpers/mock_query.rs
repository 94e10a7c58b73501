use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use sysview::{
    QueryError, ServiceEntry, ServiceSnapshot, Snapshot, SnapshotKind, SystemQuery, TaskEntry,
    TaskSnapshot,
};

/// A query that fails on the calls listed in `failures`, counting every call.
#[derive(Clone)]
pub struct FlakyQuery {
    pub kind: SnapshotKind,
    pub calls: Arc<AtomicUsize>,
    failures: Arc<Mutex<VecDeque<usize>>>,
}

impl FlakyQuery {
    pub fn new(kind: SnapshotKind, failing_calls: &[usize]) -> Self {
        Self {
            kind,
            calls: Arc::new(AtomicUsize::new(0)),
            failures: Arc::new(Mutex::new(failing_calls.iter().copied().collect())),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SystemQuery for FlakyQuery {
    fn kind(&self) -> SnapshotKind {
        self.kind
    }

    fn query(&mut self) -> Result<Snapshot, QueryError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let mut failures = self.failures.lock().unwrap();
        if failures.front() == Some(&call) {
            failures.pop_front();
            return Err(QueryError::Command {
                command: "sc query".to_string(),
                reason: "exit code 1060".to_string(),
            });
        }
        Ok(snapshot_for(self.kind, call))
    }
}

/// A small snapshot of `kind` whose first row name encodes the call number.
pub fn snapshot_for(kind: SnapshotKind, call: usize) -> Snapshot {
    match kind {
        SnapshotKind::Tasks => Snapshot::Tasks(TaskSnapshot::new(vec![TaskEntry {
            name: format!("task-{call}"),
            path: "\\".to_string(),
            state: "Ready".to_string(),
            next_run_time: "N/A".to_string(),
        }])),
        _ => Snapshot::Services(ServiceSnapshot::new(vec![ServiceEntry {
            name: format!("svc-{call}"),
            state: "running".to_string(),
        }])),
    }
}
