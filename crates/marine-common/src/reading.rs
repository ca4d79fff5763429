//! Buoy observations and wave model output.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::location::compass_direction;

/// A single wave train: either the combined sea state or one swell component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Swell {
    /// Significant wave height in meters.
    pub wave_height: f64,
    /// Period in seconds.
    pub period: f64,
    /// Direction the waves come from, in degrees.
    #[serde(default)]
    pub direction: Option<f64>,
}

impl Swell {
    pub fn compass_direction(&self) -> Option<&'static str> {
        self.direction.map(compass_direction)
    }
}

/// One observation (or forecast step) at a buoy or model grid point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuoyReading {
    pub date: DateTime<Utc>,

    #[serde(default)]
    pub wave_summary: Option<Swell>,

    #[serde(default)]
    pub swell_components: Vec<Swell>,

    /// Wind speed in m/s.
    #[serde(default)]
    pub wind_speed: Option<f64>,
    #[serde(default)]
    pub wind_direction: Option<f64>,
    #[serde(default)]
    pub wind_gust: Option<f64>,

    /// Degrees Celsius.
    #[serde(default)]
    pub air_temperature: Option<f64>,
    #[serde(default)]
    pub water_temperature: Option<f64>,
    #[serde(default)]
    pub dewpoint: Option<f64>,

    /// Sea level pressure in hPa.
    #[serde(default)]
    pub pressure: Option<f64>,
    /// Visibility in nautical miles.
    #[serde(default)]
    pub visibility: Option<f64>,
}

impl BuoyReading {
    /// An otherwise empty reading at `date`.
    pub fn at(date: DateTime<Utc>) -> Self {
        Self {
            date,
            wave_summary: None,
            swell_components: Vec::new(),
            wind_speed: None,
            wind_direction: None,
            wind_gust: None,
            air_temperature: None,
            water_temperature: None,
            dewpoint: None,
            pressure: None,
            visibility: None,
        }
    }

    pub fn wind_compass_direction(&self) -> Option<&'static str> {
        self.wind_direction.map(compass_direction)
    }

    /// True if the reading carries any wave information.
    pub fn has_wave_data(&self) -> bool {
        self.wave_summary.is_some() || !self.swell_components.is_empty()
    }
}
