pub mod models;
pub mod query;

pub use models::{ServiceEntry, ServiceSnapshot};
pub use query::{parse_sc_query, parse_systemctl_units, ServiceQuery};
