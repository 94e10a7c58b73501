use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use encoding_rs::Encoding;
use log::info;

use crate::shared::collector::{DEFAULT_INTERVAL_MS, MAX_INTERVAL_MS};
use crate::shared::command::resolve_encoding;
use crate::shared::error::ConfigError;
use crate::shared::rate::RateBounds;
use crate::shared::snapshot::SnapshotKind;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// env_logger filter used when RUST_LOG is not set.
    pub log_level: String,
    /// Encoding of the Windows console tools' output.
    pub console_encoding: String,
    pub shutdown_grace_ms: u64,
    pub rate: RateBounds,
    pub collectors: CollectorsConfig,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CollectorsConfig {
    pub system: CollectorConfig,
    pub processes: CollectorConfig,
    pub services: CollectorConfig,
    pub tasks: CollectorConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CollectorConfig {
    pub enabled: bool,
    pub interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            console_encoding: default_console_encoding(),
            shutdown_grace_ms: DEFAULT_SHUTDOWN_GRACE_MS,
            rate: RateBounds::default(),
            collectors: CollectorsConfig::default(),
        }
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: DEFAULT_INTERVAL_MS,
        }
    }
}

impl CollectorsConfig {
    pub fn get(&self, kind: SnapshotKind) -> &CollectorConfig {
        match kind {
            SnapshotKind::System => &self.system,
            SnapshotKind::Processes => &self.processes,
            SnapshotKind::Services => &self.services,
            SnapshotKind::Tasks => &self.tasks,
        }
    }
}

impl Config {
    /// Loads and validates `path`. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        if !path_ref.exists() {
            info!("No config at {}, using defaults", path_ref.display());
            return Ok(Self::default());
        }

        let path_display = path_ref.display().to_string();
        let text = fs::read_to_string(path_ref).map_err(|source| ConfigError::Read {
            path: path_display.clone(),
            source,
        })?;

        let cfg: Config = serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path_display,
            source,
        })?;

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rate.min_ms == 0 {
            return Err(ConfigError::Invalid("rate.min_ms must be positive".to_string()));
        }
        if self.rate.min_ms > self.rate.max_ms {
            return Err(ConfigError::Invalid(format!(
                "rate.min_ms ({}) exceeds rate.max_ms ({})",
                self.rate.min_ms, self.rate.max_ms
            )));
        }
        if self.rate.max_ms > MAX_INTERVAL_MS {
            return Err(ConfigError::Invalid(format!(
                "rate.max_ms ({}) exceeds {MAX_INTERVAL_MS}",
                self.rate.max_ms
            )));
        }
        for kind in SnapshotKind::ALL {
            let interval = self.collectors.get(kind).interval_ms;
            if interval == 0 || interval > MAX_INTERVAL_MS {
                return Err(ConfigError::Invalid(format!(
                    "collectors.{kind}.interval_ms must be within 1..={MAX_INTERVAL_MS}"
                )));
            }
        }
        if resolve_encoding(&self.console_encoding).is_none() {
            return Err(ConfigError::Invalid(format!(
                "unknown console_encoding '{}'",
                self.console_encoding
            )));
        }
        Ok(())
    }

    /// The console encoding, falling back to UTF-8 for an unknown label.
    pub fn encoding(&self) -> &'static Encoding {
        resolve_encoding(&self.console_encoding).unwrap_or(encoding_rs::UTF_8)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }

    pub fn example_yaml() -> &'static str {
        include_str!("../../sysview.yaml.example")
    }
}

const DEFAULT_SHUTDOWN_GRACE_MS: u64 = 2_000;

fn default_log_level() -> String {
    "info".to_string()
}

fn default_console_encoding() -> String {
    "utf-8".to_string()
}
