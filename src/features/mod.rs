pub mod process;
pub mod scheduled_task;
pub mod service;
pub mod system_metrics;
