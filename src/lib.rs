pub mod features;
pub mod presenter;
pub mod shared;

// Re-export commonly used items from features
pub use features::process::{ProcessEntry, ProcessQuery, ProcessSnapshot};
pub use features::scheduled_task::{ScheduledTaskQuery, TaskEntry, TaskSnapshot};
pub use features::service::{ServiceEntry, ServiceQuery, ServiceSnapshot};
pub use features::system_metrics::{
    DiskEntry,
    SystemMetricsQuery,
    SystemSnapshot,
};

// Re-export the polling core
pub use shared::collector::{Collector, DEFAULT_INTERVAL_MS, MAX_INTERVAL_MS, MIN_INTERVAL_MS};
pub use shared::config::Config;
pub use shared::error::{
    AlreadyTerminated,
    ConfigError,
    QueryError,
    StartError,
    SubscribeError,
    SysviewError,
};
pub use shared::lifecycle::LifecycleManager;
pub use shared::notification::{Dispatcher, NotificationChannel};
pub use shared::rate::{RateBounds, RateController};
pub use shared::snapshot::{Notification, Snapshot, SnapshotKind};
pub use shared::traits::{Presenter, SystemQuery, Validatable};

/// Builds the OS-backed query for `kind`.
pub fn system_query(kind: SnapshotKind, config: &Config) -> Box<dyn SystemQuery> {
    match kind {
        SnapshotKind::System => Box::new(SystemMetricsQuery::new()),
        SnapshotKind::Processes => Box::new(ProcessQuery::new()),
        SnapshotKind::Services => Box::new(ServiceQuery::new(config.encoding())),
        SnapshotKind::Tasks => Box::new(ScheduledTaskQuery::new(config.encoding())),
    }
}
