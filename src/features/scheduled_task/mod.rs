pub mod models;
pub mod query;

pub use models::{TaskEntry, TaskSnapshot};
pub use query::{parse_schtasks_csv, parse_systemd_timers, ScheduledTaskQuery};
