//! Test data generators for creating synthetic marine data.
//!
//! These generators create predictable, verifiable test data patterns
//! that can be used across the test suite.

use chrono::{DateTime, Duration, Utc};
use marine_common::{
    BuoyReading, Datum, Location, StationInfo, Swell, TidalEvent, TideBundle, TideEvent,
    TidePrediction,
};

/// Creates station metadata for an active buoy at (`lat`, `lon`).
///
/// # Panics
///
/// Panics if the coordinates are out of range.
pub fn create_station_info(station_id: &str, lat: f64, lon: f64) -> StationInfo {
    StationInfo {
        station_id: station_id.to_string(),
        name: format!("Test Station {}", station_id),
        location: Location::new(lat, lon).expect("fixture coordinates must be valid"),
        active: true,
        buoy_type: Some("buoy".to_string()),
        owner: Some("NDBC".to_string()),
        program: None,
    }
}

/// A location `km` kilometers due north of `origin`.
///
/// Due north keeps the haversine distance exact, so tests can assert on it.
pub fn location_north_of(origin: (f64, f64), km: f64) -> (f64, f64) {
    let delta = (km / marine_common::location::EARTH_RADIUS_KM).to_degrees();
    (origin.0 + delta, origin.1)
}

/// Creates a reading with predictable wave and wind values.
///
/// Wave height is `1.0 + index * 0.1` meters, period `8 + index` seconds,
/// wind speed `5 + index` m/s. Readings go back in time an hour per index.
pub fn create_reading(start: DateTime<Utc>, index: usize) -> BuoyReading {
    let i = index as f64;
    let mut reading = BuoyReading::at(start - Duration::hours(index as i64));
    reading.wave_summary = Some(Swell {
        wave_height: 1.0 + i * 0.1,
        period: 8.0 + i,
        direction: Some(180.0),
    });
    reading.swell_components = vec![Swell {
        wave_height: 0.8 + i * 0.1,
        period: 12.0,
        direction: Some(200.0),
    }];
    reading.wind_speed = Some(5.0 + i);
    reading.wind_direction = Some(270.0);
    reading.air_temperature = Some(18.5);
    reading.water_temperature = Some(16.0);
    reading.pressure = Some(1015.2);
    reading
}

/// Creates `count` readings, newest first.
pub fn create_reading_series(start: DateTime<Utc>, count: usize) -> Vec<BuoyReading> {
    (0..count).map(|i| create_reading(start, i)).collect()
}

/// Creates a tide bundle with alternating high/low events and hourly predictions.
///
/// Event `i` is at `start + i * 6h` with level 1.5 (high) or 0.2 (low).
/// Prediction `i` is at `start + i h` with level `0.1 * i`.
pub fn create_tide_bundle(
    datum: Datum,
    start: DateTime<Utc>,
    events: usize,
    predictions: usize,
) -> TideBundle {
    let events = (0..events)
        .map(|i| {
            let high = i % 2 == 0;
            TideEvent {
                date: start + Duration::hours(6 * i as i64),
                tidal_event: if high { TidalEvent::High } else { TidalEvent::Low },
                water_level: if high { 1.5 } else { 0.2 },
                datum,
            }
        })
        .collect();

    let predictions = (0..predictions)
        .map(|i| TidePrediction {
            date: start + Duration::hours(i as i64),
            water_level: 0.1 * i as f64,
            datum,
        })
        .collect();

    TideBundle {
        events,
        predictions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{locations, time};

    #[test]
    fn test_location_north_of_distance() {
        let (lat, lon) = location_north_of(locations::NEWPORT, 2.0);
        let origin = Location::new(locations::NEWPORT.0, locations::NEWPORT.1).unwrap();
        let moved = Location::new(lat, lon).unwrap();
        assert!((origin.distance_km(&moved) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_reading_series_newest_first() {
        let series = create_reading_series(time::reference_time(), 3);
        assert_eq!(series.len(), 3);
        assert!(series[0].date > series[1].date);
        assert_eq!(series[2].wind_speed, Some(7.0));
    }

    #[test]
    fn test_tide_bundle_counts() {
        let bundle = create_tide_bundle(Datum::MeanSeaLevel, time::reference_time(), 3, 12);
        assert_eq!(bundle.events.len(), 3);
        assert_eq!(bundle.predictions.len(), 12);
        assert_eq!(bundle.events[1].tidal_event, TidalEvent::Low);
        assert!(bundle.predictions.iter().all(|p| p.datum == Datum::MeanSeaLevel));
    }
}
