//! Time windows for tide and forecast queries.

use chrono::{DateTime, Duration, DurationRound, Utc};
use serde::{Deserialize, Serialize};

/// A closed time range `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// A window of `days` days beginning at the top of the hour containing `now`.
    ///
    /// Aligning the start keeps cache keys identical for every request made
    /// within the same hour.
    pub fn days_from(now: DateTime<Utc>, days: u32) -> Self {
        let start = now.duration_trunc(Duration::hours(1)).unwrap_or(now);
        Self {
            start,
            end: start + Duration::days(i64::from(days)),
        }
    }

    pub fn contains(&self, dt: &DateTime<Utc>) -> bool {
        dt >= &self.start && dt <= &self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}
