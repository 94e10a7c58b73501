pub mod collector;
pub mod command;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod notification;
pub mod rate;
pub mod snapshot;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;

pub use error::*;
pub use traits::*;
