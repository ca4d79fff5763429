//! The shapes a station fetch can produce.

use serde::{Deserialize, Serialize};

use crate::reading::BuoyReading;
use crate::tide::TideBundle;

/// Result of a station fetch, tagged by shape.
///
/// Buoys answer with either a single latest reading or a detailed series;
/// tide stations answer with events and predictions together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum FetchResult {
    Reading(BuoyReading),
    ReadingSeries(Vec<BuoyReading>),
    TideBundle(TideBundle),
}

impl FetchResult {
    /// A single reading is never empty; series and bundles are empty when
    /// they hold nothing.
    pub fn is_empty(&self) -> bool {
        match self {
            FetchResult::Reading(_) => false,
            FetchResult::ReadingSeries(readings) => readings.is_empty(),
            FetchResult::TideBundle(bundle) => bundle.is_empty(),
        }
    }

    /// Normalize buoy shapes into a list of readings.
    ///
    /// A tide bundle carries no readings and yields an empty list.
    pub fn into_readings(self) -> Vec<BuoyReading> {
        match self {
            FetchResult::Reading(reading) => vec![reading],
            FetchResult::ReadingSeries(readings) => readings,
            FetchResult::TideBundle(_) => Vec::new(),
        }
    }

    pub fn into_tide_bundle(self) -> Option<TideBundle> {
        match self {
            FetchResult::TideBundle(bundle) => Some(bundle),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            FetchResult::Reading(_) => "reading",
            FetchResult::ReadingSeries(_) => "reading_series",
            FetchResult::TideBundle(_) => "tide_bundle",
        }
    }
}
