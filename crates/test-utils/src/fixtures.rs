//! Common test fixtures for marine-data tests.
//!
//! This module provides pre-defined test data that represents common
//! scenarios in buoy and tide lookups.

/// Common query locations as (latitude, longitude).
pub mod locations {
    /// Newport, RI (Atlantic model region)
    pub const NEWPORT: (f64, f64) = (41.4302, -71.455);

    /// Monterey Bay, CA (US west coast model region)
    pub const MONTEREY: (f64, f64) = (36.6, -121.9);

    /// Open Pacific, west of the west coast model box
    pub const MID_PACIFIC: (f64, f64) = (30.0, -160.0);

    /// Latitude just past the pole
    pub const BAD_LATITUDE: (f64, f64) = (91.0, -71.455);

    /// Longitude just past the antimeridian
    pub const BAD_LONGITUDE: (f64, f64) = (41.4302, -181.0);
}

/// Common station identifiers.
pub mod stations {
    /// Newport, RI tide gauge
    pub const NEWPORT_TIDES: &str = "8452660";

    /// Block Island buoy
    pub const BLOCK_ISLAND_BUOY: &str = "44097";

    /// Monterey buoy
    pub const MONTEREY_BUOY: &str = "46042";

    /// An identifier no directory knows
    pub const UNKNOWN: &str = "00000";
}

/// Common time values for testing.
pub mod time {
    use chrono::{DateTime, TimeZone, Utc};

    /// A fixed reference time for tests (2024-06-01T12:00:00Z)
    pub const REFERENCE_TIME: &str = "2024-06-01T12:00:00Z";

    pub fn reference_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0)
            .single()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_time_matches_string() {
        assert_eq!(time::reference_time().to_rfc3339(), "2024-06-01T12:00:00+00:00");
        assert!(time::REFERENCE_TIME.starts_with("2024-06-01T12"));
    }

    #[test]
    fn test_bad_locations_are_out_of_range() {
        assert!(locations::BAD_LATITUDE.0 > 90.0);
        assert!(locations::BAD_LONGITUDE.1 < -180.0);
    }
}
