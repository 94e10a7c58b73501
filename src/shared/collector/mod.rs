//! Autonomous sampling loop, one per snapshot kind.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, trace, warn};
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::Notify;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::shared::error::{AlreadyTerminated, QueryError, StartError};
use crate::shared::notification::NotificationChannel;
use crate::shared::snapshot::{Notification, Snapshot, SnapshotKind};
use crate::shared::traits::{SystemQuery, Validatable};

pub const MIN_INTERVAL_MS: u64 = 1;
pub const MAX_INTERVAL_MS: u64 = 3_600_000;
pub const DEFAULT_INTERVAL_MS: u64 = 1_000;

/// Clamps a raw control value into the accepted interval range.
pub fn clamp_interval_ms(value: i64) -> u64 {
    value.clamp(MIN_INTERVAL_MS as i64, MAX_INTERVAL_MS as i64) as u64
}

/// Handle to one sampling loop. Clones refer to the same collector.
#[derive(Clone)]
pub struct Collector {
    shared: Arc<Shared>,
}

struct Shared {
    kind: SnapshotKind,
    interval_ms: AtomicU64,
    rate_changed: Notify,
    query: Arc<Mutex<Box<dyn SystemQuery>>>,
    channel: NotificationChannel,
    state: Mutex<Lifecycle>,
    task: Mutex<Option<JoinHandle<()>>>,
}

enum Lifecycle {
    Idle,
    Running(CancellationToken),
    Terminated,
}

impl Collector {
    pub fn new<Q>(query: Q, channel: NotificationChannel, interval_ms: u64) -> Self
    where
        Q: SystemQuery,
    {
        let kind = query.kind();
        Self {
            shared: Arc::new(Shared {
                kind,
                interval_ms: AtomicU64::new(interval_ms.clamp(MIN_INTERVAL_MS, MAX_INTERVAL_MS)),
                rate_changed: Notify::new(),
                query: Arc::new(Mutex::new(Box::new(query))),
                channel,
                state: Mutex::new(Lifecycle::Idle),
                task: Mutex::new(None),
            }),
        }
    }

    pub fn kind(&self) -> SnapshotKind {
        self.shared.kind
    }

    pub fn interval_ms(&self) -> u64 {
        self.shared.interval_ms.load(Ordering::Acquire)
    }

    /// Starts the loop on the current tokio runtime.
    pub fn start(&self) -> Result<(), StartError> {
        let handle = Handle::try_current().map_err(|source| StartError::NoRuntime {
            kind: self.kind(),
            source,
        })?;
        self.start_on(&handle)
    }

    /// Starts the loop on `handle`. A collector starts at most once.
    pub fn start_on(&self, handle: &Handle) -> Result<(), StartError> {
        // May touch the filesystem; keep it outside the lifecycle lock.
        if let Err(e) = self.shared.query.lock().health_check() {
            warn!("{} source looks unhealthy, sampling anyway: {}", self.kind(), e);
        }

        let mut state = self.shared.state.lock();
        match *state {
            Lifecycle::Idle => {}
            Lifecycle::Running(_) => return Err(StartError::AlreadyRunning(self.kind())),
            Lifecycle::Terminated => return Err(StartError::Terminated(self.kind())),
        }

        let cancel = CancellationToken::new();
        let task = handle.spawn(sampling_loop(Arc::clone(&self.shared), cancel.clone()));
        *self.shared.task.lock() = Some(task);
        *state = Lifecycle::Running(cancel);
        info!("{} collector started, interval {} ms", self.kind(), self.interval_ms());
        Ok(())
    }

    /// Stores a new interval; a loop that is currently waiting restarts its
    /// wait with the new value. Returns the value actually applied.
    pub fn set_interval_ms(&self, value: i64) -> Result<u64, AlreadyTerminated> {
        if matches!(*self.shared.state.lock(), Lifecycle::Terminated) {
            return Err(AlreadyTerminated(self.kind()));
        }

        let applied = clamp_interval_ms(value);
        let previous = self.shared.interval_ms.swap(applied, Ordering::AcqRel);
        if previous != applied {
            self.shared.rate_changed.notify_one();
            debug!("{} interval {} ms -> {} ms", self.kind(), previous, applied);
        }
        Ok(applied)
    }

    /// Requests the loop to exit. Idempotent.
    ///
    /// Once this returns nothing more is published; a blocking query already
    /// in flight finishes on its own and its result is discarded.
    pub fn terminate(&self) {
        let mut state = self.shared.state.lock();
        match std::mem::replace(&mut *state, Lifecycle::Terminated) {
            Lifecycle::Running(cancel) => {
                cancel.cancel();
                info!("{} collector terminated", self.kind());
            }
            Lifecycle::Idle => debug!("{} collector terminated before start", self.kind()),
            Lifecycle::Terminated => {}
        }
    }

    pub fn stop(&self) {
        self.terminate()
    }

    pub fn is_running(&self) -> bool {
        matches!(*self.shared.state.lock(), Lifecycle::Running(_))
            && self
                .shared
                .task
                .lock()
                .as_ref()
                .is_some_and(|task| !task.is_finished())
    }

    pub fn is_terminated(&self) -> bool {
        matches!(*self.shared.state.lock(), Lifecycle::Terminated)
    }

    /// Hands out the loop's join handle, once.
    pub(crate) fn take_task(&self) -> Option<JoinHandle<()>> {
        self.shared.task.lock().take()
    }
}

impl Shared {
    /// Publishes unless termination was requested. Holding the lifecycle lock
    /// here orders every publish before or after `terminate`, never across it.
    fn publish_unless_stopped(&self, cancel: &CancellationToken, notification: Notification) -> bool {
        let _state = self.state.lock();
        if cancel.is_cancelled() {
            return false;
        }
        self.channel.publish(notification);
        true
    }
}

async fn sampling_loop(shared: Arc<Shared>, cancel: CancellationToken) {
    let kind = shared.kind;
    let mut cycles = 0_u64;

    loop {
        if cancel.is_cancelled() {
            break;
        }

        let result = run_query(kind, &shared.query).await;
        cycles += 1;

        if cancel.is_cancelled() {
            debug!("{} result of cycle {} discarded after stop", kind, cycles);
            break;
        }

        let notification = match result {
            Ok(snapshot) => {
                debug!("{} cycle {}: {} rows", kind, cycles, snapshot.row_count());
                Notification::Snapshot(snapshot)
            }
            Err(error) => {
                warn!("{} cycle {} failed: {}", kind, cycles, error);
                Notification::NoData { kind, error }
            }
        };

        if !shared.publish_unless_stopped(&cancel, notification) {
            break;
        }

        if !wait_next_cycle(&shared, &cancel).await {
            break;
        }
    }

    debug!("{} sampling loop exited after {} cycles", kind, cycles);
}

/// Sleeps for the current interval. A rate change restarts the sleep with the
/// new value. Returns `false` when the collector was stopped.
async fn wait_next_cycle(shared: &Shared, cancel: &CancellationToken) -> bool {
    loop {
        let wait = Duration::from_millis(shared.interval_ms.load(Ordering::Acquire));
        tokio::select! {
            _ = cancel.cancelled() => return false,
            _ = shared.rate_changed.notified() => {
                trace!("{} wait restarted after rate change", shared.kind);
            }
            _ = tokio::time::sleep(wait) => return true,
        }
    }
}

async fn run_query(
    kind: SnapshotKind,
    query: &Arc<Mutex<Box<dyn SystemQuery>>>,
) -> Result<Snapshot, QueryError> {
    let query = Arc::clone(query);
    let snapshot = match tokio::task::spawn_blocking(move || query.lock().query()).await {
        Ok(result) => result?,
        Err(join_error) => return Err(QueryError::Panicked(panic_message(join_error))),
    };

    if snapshot.kind() != kind {
        return Err(QueryError::Invalid(format!(
            "{} query returned a {} snapshot",
            kind,
            snapshot.kind()
        )));
    }
    snapshot.validate().map_err(QueryError::Invalid)?;
    Ok(snapshot)
}

fn panic_message(error: JoinError) -> String {
    if !error.is_panic() {
        return error.to_string();
    }
    let payload = error.into_panic();
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        String::from("non-string panic payload")
    }
}
