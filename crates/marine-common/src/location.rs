//! Geographic locations and great-circle distance.

use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::{MarineError, MarineResult};

/// Valid latitude range in degrees.
pub const LATITUDE_RANGE: RangeInclusive<f64> = -90.0..=90.0;

/// Valid longitude range in degrees.
pub const LONGITUDE_RANGE: RangeInclusive<f64> = -180.0..=180.0;

/// Mean Earth radius used for distance calculations, in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A point on the Earth's surface (WGS84 degrees).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    /// Create a location, rejecting non-finite or out-of-range coordinates.
    pub fn new(latitude: f64, longitude: f64) -> MarineResult<Self> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && LATITUDE_RANGE.contains(&latitude)
            && LONGITUDE_RANGE.contains(&longitude);

        if !valid {
            return Err(MarineError::InvalidCoordinates {
                latitude,
                longitude,
            });
        }

        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Longitude expressed in [0, 360), as wave model grids use.
    pub fn absolute_longitude(&self) -> f64 {
        if self.longitude < 0.0 {
            360.0 + self.longitude
        } else {
            self.longitude
        }
    }

    /// Haversine distance to another location in kilometers.
    pub fn distance_km(&self, other: &Location) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let delta_lat = (other.latitude - self.latitude).to_radians();
        let delta_lon = (other.longitude - self.longitude).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
        // Rounding can push `a` just past 1 for near-antipodal points.
        let c = 2.0 * a.sqrt().min(1.0).asin();

        EARTH_RADIUS_KM * c
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.latitude, self.longitude)
    }
}

/// Convert a bearing in degrees to a 16-point compass direction.
pub fn compass_direction(degrees: f64) -> &'static str {
    const POINTS: [&str; 16] = [
        "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW",
        "NW", "NNW",
    ];

    let normalized = degrees.rem_euclid(360.0);
    let index = ((normalized / 22.5) + 0.5).floor() as usize % POINTS.len();
    POINTS[index]
}
