//! Startup and shutdown of every collector in the application.

use std::time::Duration;

use futures::future::join_all;
use log::{debug, error, info, warn};
use tokio::runtime::Handle;

use crate::shared::collector::Collector;
use crate::shared::error::StartError;
use crate::shared::snapshot::SnapshotKind;

/// Owns the ordered set of collectors and guarantees they are all stopped.
pub struct LifecycleManager {
    handle: Handle,
    collectors: Vec<Collector>,
}

impl LifecycleManager {
    /// Collectors are started on `handle`'s runtime.
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            collectors: Vec::new(),
        }
    }

    pub fn register(&mut self, collector: Collector) {
        if self.collector(collector.kind()).is_some() {
            warn!("a {} collector is already registered", collector.kind());
        }
        self.collectors.push(collector);
    }

    pub fn collectors(&self) -> &[Collector] {
        &self.collectors
    }

    /// First registered collector of `kind`.
    pub fn collector(&self, kind: SnapshotKind) -> Option<&Collector> {
        self.collectors.iter().find(|c| c.kind() == kind)
    }

    /// Starts every collector. A failure is logged and returned but never
    /// keeps the remaining collectors from starting.
    pub fn start_all(&self) -> Vec<(SnapshotKind, StartError)> {
        let mut failures = Vec::new();
        for collector in &self.collectors {
            if let Err(e) = collector.start_on(&self.handle) {
                error!("Failed to start {} collector: {}", collector.kind(), e);
                failures.push((collector.kind(), e));
            }
        }
        info!(
            "{} of {} collectors started",
            self.collectors.len() - failures.len(),
            self.collectors.len()
        );
        failures
    }

    /// Requests every collector to terminate. Safe to call repeatedly; does
    /// not wait for in-flight queries.
    pub fn stop_all(&self) {
        for collector in &self.collectors {
            collector.terminate();
        }
        debug!("stop requested for {} collectors", self.collectors.len());
    }

    /// Waits up to `grace` for the sampling loops to exit. Returns `true` when
    /// all of them did.
    pub async fn wait_stopped(&self, grace: Duration) -> bool {
        let tasks: Vec<_> = self.collectors.iter().filter_map(Collector::take_task).collect();
        if tasks.is_empty() {
            return true;
        }

        match tokio::time::timeout(grace, join_all(tasks)).await {
            Ok(results) => {
                for result in results.into_iter().filter_map(Result::err) {
                    error!("collector task ended abnormally: {}", result);
                }
                info!("All collectors stopped");
                true
            }
            Err(_) => {
                warn!("Collectors still busy after {:?}; abandoning in-flight queries", grace);
                false
            }
        }
    }

    pub fn active_count(&self) -> usize {
        self.collectors.iter().filter(|c| c.is_running()).count()
    }
}

impl Drop for LifecycleManager {
    fn drop(&mut self) {
        self.stop_all();
    }
}
