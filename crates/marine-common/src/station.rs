//! Station metadata.

use serde::{Deserialize, Serialize};

use crate::location::Location;

/// Descriptive metadata for a buoy or tide station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationInfo {
    pub station_id: String,
    pub name: String,
    pub location: Location,

    /// Whether the station is currently reporting.
    #[serde(default = "default_active")]
    pub active: bool,

    /// Platform type, e.g. "buoy", "fixed", "dart".
    #[serde(default)]
    pub buoy_type: Option<String>,

    #[serde(default)]
    pub owner: Option<String>,

    #[serde(default)]
    pub program: Option<String>,
}

fn default_active() -> bool {
    true
}

/// Criteria applied when searching for nearby stations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StationFilter {
    /// Only return active stations.
    pub active_only: bool,
    /// Only return stations of this platform type (case-insensitive).
    pub buoy_type: Option<String>,
}

impl StationFilter {
    pub fn matches(&self, info: &StationInfo) -> bool {
        if self.active_only && !info.active {
            return false;
        }
        match (&self.buoy_type, &info.buoy_type) {
            (None, _) => true,
            (Some(wanted), Some(actual)) => wanted.eq_ignore_ascii_case(actual),
            (Some(_), None) => false,
        }
    }
}
