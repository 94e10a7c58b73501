use thiserror::Error;
use std::io;

use crate::shared::snapshot::SnapshotKind;

#[derive(Error, Debug)]
pub enum SysviewError {
    #[error("Configuration failed: {0}")]
    Config(#[from] ConfigError),

    #[error("Subscription failed: {0}")]
    Subscribe(#[from] SubscribeError),

    #[error("Runtime failed: {0}")]
    Runtime(#[from] io::Error),
}

/// A single sampling cycle failed to produce data.
///
/// Always recoverable: the collector reports it and keeps sampling.
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Command `{command}` failed: {reason}")]
    Command { command: String, reason: String },

    #[error("Failed to parse output: {0}")]
    Parse(String),

    #[error("Snapshot rejected: {0}")]
    Invalid(String),

    #[error("Not supported on this platform: {0}")]
    Unsupported(&'static str),

    #[error("Query panicked: {0}")]
    Panicked(String),
}

#[derive(Error, Debug)]
pub enum StartError {
    #[error("{0} collector is already running")]
    AlreadyRunning(SnapshotKind),

    #[error("{0} collector was terminated and cannot be restarted")]
    Terminated(SnapshotKind),

    #[error("no tokio runtime available to start the {kind} collector")]
    NoRuntime {
        kind: SnapshotKind,
        #[source]
        source: tokio::runtime::TryCurrentError,
    },
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{0} collector is already terminated")]
pub struct AlreadyTerminated(pub SnapshotKind);

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscribeError {
    #[error("a handler for {0} is already registered")]
    AlreadySubscribed(SnapshotKind),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid config: {0}")]
    Invalid(String),
}
