//! Scripted query doubles shared by the unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::features::process::{ProcessEntry, ProcessSnapshot};
use crate::features::scheduled_task::{TaskEntry, TaskSnapshot};
use crate::features::service::{ServiceEntry, ServiceSnapshot};
use crate::features::system_metrics::SystemSnapshot;
use crate::shared::error::QueryError;
use crate::shared::snapshot::{Snapshot, SnapshotKind};
use crate::shared::traits::SystemQuery;

#[derive(Debug, Clone, Copy)]
pub enum Step {
    Ok,
    Fail,
    Panic,
}

/// Replays `steps` in order, then succeeds forever.
#[derive(Clone)]
pub struct ScriptedQuery {
    kind: SnapshotKind,
    inner: Arc<Inner>,
    produce: fn(SnapshotKind) -> Snapshot,
    latency: Duration,
}

struct Inner {
    steps: Mutex<VecDeque<Step>>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    times: Mutex<Vec<Instant>>,
}

impl ScriptedQuery {
    pub fn new(kind: SnapshotKind, steps: Vec<Step>) -> Self {
        Self {
            kind,
            inner: Arc::new(Inner {
                steps: Mutex::new(steps.into()),
                calls: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
                times: Mutex::new(Vec::new()),
            }),
            produce: sample_snapshot,
            latency: Duration::ZERO,
        }
    }

    pub fn returning(mut self, produce: fn(SnapshotKind) -> Snapshot) -> Self {
        self.produce = produce;
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn calls(&self) -> usize {
        self.inner.calls.load(Ordering::SeqCst)
    }

    pub fn call_times(&self) -> Vec<Instant> {
        self.inner.times.lock().clone()
    }

    /// Highest number of overlapping `query` calls seen so far.
    pub fn max_in_flight(&self) -> usize {
        self.inner.max_in_flight.load(Ordering::SeqCst)
    }
}

/// Decrements the in-flight gauge on every exit path, panics included.
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl SystemQuery for ScriptedQuery {
    fn kind(&self) -> SnapshotKind {
        self.kind
    }

    fn query(&mut self) -> Result<Snapshot, QueryError> {
        let running = self.inner.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let _in_flight = InFlight(&self.inner.in_flight);
        self.inner.max_in_flight.fetch_max(running, Ordering::SeqCst);
        self.inner.times.lock().push(Instant::now());
        self.inner.calls.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            std::thread::sleep(self.latency);
        }

        let step = self.inner.steps.lock().pop_front().unwrap_or(Step::Ok);
        match step {
            Step::Ok => Ok((self.produce)(self.kind)),
            Step::Fail => Err(QueryError::Command {
                command: "scripted".to_string(),
                reason: "scripted failure".to_string(),
            }),
            Step::Panic => panic!("scripted panic"),
        }
    }
}

pub fn sample_snapshot(kind: SnapshotKind) -> Snapshot {
    match kind {
        SnapshotKind::System => SystemSnapshot::builder()
            .cpu_name("Test CPU".to_string())
            .cpu_core_count(4)
            .cpu_load_percent(42.0)
            .ram_total(8 << 30)
            .ram_used(2 << 30)
            .disks(Vec::new())
            .build()
            .map(Snapshot::System)
            .unwrap(),
        SnapshotKind::Processes => Snapshot::Processes(ProcessSnapshot::new(vec![ProcessEntry {
            pid: 1,
            name: "init".to_string(),
            memory_usage: 4096,
            status: "Run".to_string(),
        }])),
        SnapshotKind::Services => services_ok(kind),
        SnapshotKind::Tasks => Snapshot::Tasks(TaskSnapshot::new(vec![TaskEntry {
            name: "backup".to_string(),
            path: "\\backup".to_string(),
            state: "Ready".to_string(),
            next_run_time: "n/a".to_string(),
        }])),
    }
}

pub fn services_ok(_kind: SnapshotKind) -> Snapshot {
    Snapshot::Services(ServiceSnapshot::new(vec![ServiceEntry {
        name: "sshd".to_string(),
        state: "running".to_string(),
    }]))
}
