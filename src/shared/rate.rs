//! Maps the UI's update-rate control onto a collector's interval.

use log::info;
use serde::{Deserialize, Serialize};

use crate::shared::collector::{clamp_interval_ms, Collector};
use crate::shared::error::AlreadyTerminated;
use crate::shared::snapshot::SnapshotKind;

/// Range of the rate control, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateBounds {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl Default for RateBounds {
    fn default() -> Self {
        Self {
            min_ms: 100,
            max_ms: 10_000,
        }
    }
}

impl RateBounds {
    /// Maps a raw control value to an interval the collector accepts.
    pub fn map(&self, value: i64) -> u64 {
        let lo = self.min_ms.min(self.max_ms);
        let hi = self.max_ms.max(self.min_ms);
        let mapped = (value.max(0) as u64).clamp(lo, hi);
        clamp_interval_ms(i64::try_from(mapped).unwrap_or(i64::MAX))
    }
}

/// The only path through which the UI changes a running collector's timing.
pub struct RateController {
    collector: Collector,
    bounds: RateBounds,
    last_applied: u64,
}

impl RateController {
    pub fn new(collector: Collector, bounds: RateBounds) -> Self {
        let last_applied = collector.interval_ms();
        Self {
            collector,
            bounds,
            last_applied,
        }
    }

    pub fn kind(&self) -> SnapshotKind {
        self.collector.kind()
    }

    /// Text shown next to the control while it is being moved.
    pub fn preview(&self, value: i64) -> String {
        self.bounds.map(value).to_string()
    }

    /// Applies the control value once the user lets go of it.
    pub fn commit(&mut self, value: i64) -> Result<u64, AlreadyTerminated> {
        let mapped = self.bounds.map(value);
        let applied = self.collector.set_interval_ms(mapped as i64)?;
        if applied != self.last_applied {
            info!("{} update rate set to {} ms", self.kind(), applied);
        }
        self.last_applied = applied;
        Ok(applied)
    }

    pub fn last_applied(&self) -> u64 {
        self.last_applied
    }

    pub fn text(&self) -> String {
        self.last_applied.to_string()
    }
}

/// Parses a rate command typed into the terminal: `<ms>` or `<kind> <ms>`.
///
/// A bare number targets the CPU/RAM/disk collector.
pub fn parse_rate_command(line: &str) -> Result<(SnapshotKind, i64), String> {
    let mut parts = line.split_whitespace();
    let (kind, value) = match (parts.next(), parts.next(), parts.next()) {
        (Some(value), None, None) => (SnapshotKind::System, value),
        (Some(kind), Some(value), None) => (kind.parse()?, value),
        _ => return Err(format!("expected '<ms>' or '<kind> <ms>', got '{}'", line.trim())),
    };
    let value = value
        .parse::<i64>()
        .map_err(|e| format!("invalid rate '{value}': {e}"))?;
    Ok((kind, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::collector::MAX_INTERVAL_MS;
    use crate::shared::notification::NotificationChannel;
    use crate::shared::testing::ScriptedQuery;

    fn controller(bounds: RateBounds) -> RateController {
        let query = ScriptedQuery::new(SnapshotKind::System, vec![]);
        let collector = Collector::new(query, NotificationChannel::new(), 1_000);
        RateController::new(collector, bounds)
    }

    #[test]
    fn commit_clamps_into_bounds() {
        let mut rate = controller(RateBounds::default());
        assert_eq!(rate.last_applied(), 1_000);
        assert_eq!(rate.commit(3_000), Ok(3_000));
        assert_eq!(rate.commit(0), Ok(100));
        assert_eq!(rate.commit(-7), Ok(100));
        assert_eq!(rate.commit(1_000_000), Ok(10_000));
        assert_eq!(rate.text(), "10000");
    }

    #[test]
    fn preview_reflects_without_applying() {
        let rate = controller(RateBounds::default());
        assert_eq!(rate.preview(2_500), "2500");
        assert_eq!(rate.preview(5), "100");
        assert_eq!(rate.last_applied(), 1_000);
    }

    #[test]
    fn zero_lower_bound_still_yields_positive_interval() {
        let mut rate = controller(RateBounds { min_ms: 0, max_ms: 50 });
        assert_eq!(rate.commit(0), Ok(1));
    }

    #[test]
    fn map_handles_bounds_beyond_i64() {
        let bounds = RateBounds { min_ms: 100, max_ms: u64::MAX };
        assert_eq!(bounds.map(500), 500);
        assert_eq!(bounds.map(i64::MAX), MAX_INTERVAL_MS);
        assert_eq!(bounds.map(-1), 100);

        let huge = RateBounds { min_ms: u64::MAX, max_ms: u64::MAX };
        assert_eq!(huge.map(0), MAX_INTERVAL_MS);
    }

    #[test]
    fn commit_on_terminated_collector_is_reported() {
        let mut rate = controller(RateBounds::default());
        rate.collector.terminate();
        assert_eq!(rate.commit(500), Err(AlreadyTerminated(SnapshotKind::System)));
        assert_eq!(rate.last_applied(), 1_000);
    }

    #[test]
    fn parses_rate_commands() {
        assert_eq!(parse_rate_command("3000"), Ok((SnapshotKind::System, 3000)));
        assert_eq!(
            parse_rate_command("  services 250 "),
            Ok((SnapshotKind::Services, 250))
        );
        assert!(parse_rate_command("").is_err());
        assert!(parse_rate_command("fast").is_err());
        assert!(parse_rate_command("tasks 1 2").is_err());
        assert!(parse_rate_command("gpu 100").is_err());
    }
}
