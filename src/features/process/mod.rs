pub mod models;
pub mod query;

pub use models::{ProcessEntry, ProcessSnapshot};
pub use query::ProcessQuery;
