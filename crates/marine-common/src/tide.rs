//! Tide datums, events and predictions.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::MarineError;

/// Reference water-level baseline against which tide heights are measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Datum {
    MeanLowerLowWater,
    MeanLowWater,
    MeanSeaLevel,
    MeanTideLevel,
    MeanHighWater,
    MeanHigherHighWater,
    StationDatum,
}

impl Datum {
    pub const ALL: [Datum; 7] = [
        Datum::MeanLowerLowWater,
        Datum::MeanLowWater,
        Datum::MeanSeaLevel,
        Datum::MeanTideLevel,
        Datum::MeanHighWater,
        Datum::MeanHigherHighWater,
        Datum::StationDatum,
    ];

    /// Name used in API responses and cache keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Datum::MeanLowerLowWater => "mean_lower_low_water",
            Datum::MeanLowWater => "mean_low_water",
            Datum::MeanSeaLevel => "mean_sea_level",
            Datum::MeanTideLevel => "mean_tide_level",
            Datum::MeanHighWater => "mean_high_water",
            Datum::MeanHigherHighWater => "mean_higher_high_water",
            Datum::StationDatum => "station_datum",
        }
    }

    /// NOAA CO-OPS datum code.
    pub fn code(&self) -> &'static str {
        match self {
            Datum::MeanLowerLowWater => "MLLW",
            Datum::MeanLowWater => "MLW",
            Datum::MeanSeaLevel => "MSL",
            Datum::MeanTideLevel => "MTL",
            Datum::MeanHighWater => "MHW",
            Datum::MeanHigherHighWater => "MHHW",
            Datum::StationDatum => "STND",
        }
    }

    /// Default fallback order for tide lookups.
    pub fn default_preferences() -> Vec<Datum> {
        vec![
            Datum::MeanLowerLowWater,
            Datum::MeanSeaLevel,
            Datum::MeanTideLevel,
        ]
    }
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Datum {
    type Err = MarineError;

    /// Accepts snake_case names ("mean_sea_level") or NOAA codes ("MSL").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Datum::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s) || d.code().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                MarineError::invalid_parameter("datum", format!("unknown tide datum '{}'", s))
            })
    }
}

/// Sampling interval requested from a tide station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TideInterval {
    SixMinute,
    #[default]
    Hourly,
    HighLow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TidalEvent {
    High,
    Low,
}

/// A high or low water event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TideEvent {
    pub date: DateTime<Utc>,
    pub tidal_event: TidalEvent,
    /// Water level in meters above `datum`.
    pub water_level: f64,
    pub datum: Datum,
}

/// A predicted water level at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TidePrediction {
    pub date: DateTime<Utc>,
    pub water_level: f64,
    pub datum: Datum,
}

/// Events and predictions returned together by a tide station fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TideBundle {
    #[serde(default)]
    pub events: Vec<TideEvent>,
    #[serde(default)]
    pub predictions: Vec<TidePrediction>,
}

impl TideBundle {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.predictions.is_empty()
    }
}
