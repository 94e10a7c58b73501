mod query;
mod models;

pub use query::SystemMetricsQuery;
pub use models::{
    bytes_to_gb,
    DiskEntry,
    SystemSnapshot,
    SystemSnapshotBuilder,
};
