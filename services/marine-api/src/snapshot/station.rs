//! File-backed stations and station directories.
//!
//! A directory file is a JSON array of station records. Each record carries
//! the station metadata plus whatever data was exported for it:
//!
//! ```json
//! [{
//!   "station_id": "8452660",
//!   "name": "Newport, RI",
//!   "location": { "latitude": 41.505, "longitude": -71.326 },
//!   "latest": { "date": "...", "wind_speed": 5.1 },
//!   "detailed": [ ... ],
//!   "tides": { "mean_lower_low_water": { "events": [ ... ], "predictions": [ ... ] } }
//! }]
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Timelike;
use marine_common::{
    BuoyReading, Datum, MarineError, MarineResult, Station, StationDirectory, StationInfo,
    TideBundle, TideInterval, TimeRange,
};
use serde::Deserialize;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
struct StationRecord {
    #[serde(flatten)]
    info: StationInfo,

    #[serde(default)]
    latest: Option<BuoyReading>,

    /// Newest first.
    #[serde(default)]
    detailed: Vec<BuoyReading>,

    #[serde(default)]
    tides: HashMap<Datum, TideBundle>,
}

/// A station answering from exported data.
pub struct SnapshotStation {
    info: StationInfo,
    latest: Option<BuoyReading>,
    detailed: Vec<BuoyReading>,
    tides: HashMap<Datum, TideBundle>,
}

impl From<StationRecord> for SnapshotStation {
    fn from(record: StationRecord) -> Self {
        Self {
            info: record.info,
            latest: record.latest,
            detailed: record.detailed,
            tides: record.tides,
        }
    }
}

#[async_trait]
impl Station for SnapshotStation {
    fn info(&self) -> &StationInfo {
        &self.info
    }

    async fn fetch_latest_reading(&self) -> MarineResult<Option<BuoyReading>> {
        Ok(self
            .latest
            .clone()
            .or_else(|| self.detailed.first().cloned()))
    }

    async fn fetch_detailed_wave_reading(
        &self,
        count: usize,
    ) -> MarineResult<Option<Vec<BuoyReading>>> {
        if self.detailed.is_empty() {
            return Ok(None);
        }
        Ok(Some(self.detailed.iter().take(count).cloned().collect()))
    }

    async fn fetch_tide_data(
        &self,
        range: &TimeRange,
        datum: Datum,
        interval: TideInterval,
    ) -> MarineResult<Option<TideBundle>> {
        let Some(series) = self.tides.get(&datum) else {
            return Ok(None);
        };

        let events = series
            .events
            .iter()
            .filter(|e| range.contains(&e.date))
            .cloned()
            .collect();

        let predictions = match interval {
            TideInterval::HighLow => Vec::new(),
            TideInterval::SixMinute => series
                .predictions
                .iter()
                .filter(|p| range.contains(&p.date))
                .cloned()
                .collect(),
            TideInterval::Hourly => series
                .predictions
                .iter()
                .filter(|p| range.contains(&p.date) && p.date.minute() == 0)
                .cloned()
                .collect(),
        };

        Ok(Some(TideBundle {
            events,
            predictions,
        }))
    }
}

/// A station directory read from a JSON file.
///
/// The file is read on the first successful `fetch_stations` and kept; a
/// missing or unreadable file is reported as an unavailable listing and
/// retried on the next call.
pub struct SnapshotDirectory {
    path: PathBuf,
    kind: &'static str,
    stations: RwLock<Option<Vec<Arc<dyn Station>>>>,
}

impl SnapshotDirectory {
    pub fn new(path: impl AsRef<Path>, kind: &'static str) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            kind,
            stations: RwLock::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_loaded(&self) -> bool {
        self.stations
            .read()
            .map(|stations| stations.is_some())
            .unwrap_or(false)
    }

    /// Number of stations loaded so far.
    pub fn len(&self) -> usize {
        self.stations
            .read()
            .map(|stations| stations.as_ref().map_or(0, Vec::len))
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl StationDirectory for SnapshotDirectory {
    async fn fetch_stations(&self) -> MarineResult<bool> {
        if self.is_loaded() {
            return Ok(true);
        }

        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(
                    "Cannot read {} station snapshot {:?}: {}",
                    self.kind, self.path, e
                );
                return Ok(false);
            }
        };

        let records: Vec<StationRecord> = serde_json::from_slice(&bytes).map_err(|e| {
            MarineError::UpstreamFailure(format!(
                "Malformed {} station snapshot {:?}: {}",
                self.kind, self.path, e
            ))
        })?;

        let stations: Vec<Arc<dyn Station>> = records
            .into_iter()
            .map(|record| Arc::new(SnapshotStation::from(record)) as Arc<dyn Station>)
            .collect();

        info!(
            "Loaded {} {} stations from {:?}",
            stations.len(),
            self.kind,
            self.path
        );

        let mut slot = self
            .stations
            .write()
            .map_err(|_| MarineError::Internal("station list lock poisoned".into()))?;
        *slot = Some(stations);

        Ok(true)
    }

    fn stations(&self) -> Vec<Arc<dyn Station>> {
        self.stations
            .read()
            .ok()
            .and_then(|stations| stations.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use marine_common::{Location, StationFilter};
    use std::io::Write;

    const BUOYS: &str = r#"[
        {
            "station_id": "44097",
            "name": "Block Island, RI",
            "location": { "latitude": 40.967, "longitude": -71.126 },
            "buoy_type": "buoy",
            "owner": "SCRIPPS",
            "detailed": [
                { "date": "2024-06-01T12:00:00Z", "wave_summary": { "wave_height": 1.2, "period": 8.0 } },
                { "date": "2024-06-01T11:00:00Z", "wave_summary": { "wave_height": 1.1, "period": 8.0 } },
                { "date": "2024-06-01T10:00:00Z", "wave_summary": { "wave_height": 1.0, "period": 7.0 } }
            ]
        },
        {
            "station_id": "BUZM3",
            "name": "Buzzards Bay",
            "location": { "latitude": 41.397, "longitude": -71.033 },
            "active": false,
            "buoy_type": "fixed"
        }
    ]"#;

    const TIDES: &str = r#"[
        {
            "station_id": "8452660",
            "name": "Newport, RI",
            "location": { "latitude": 41.505, "longitude": -71.326 },
            "tides": {
                "mean_sea_level": {
                    "events": [
                        { "date": "2024-06-01T14:12:00Z", "tidal_event": "high", "water_level": 0.6, "datum": "mean_sea_level" },
                        { "date": "2024-06-05T20:30:00Z", "tidal_event": "low", "water_level": -0.5, "datum": "mean_sea_level" }
                    ],
                    "predictions": [
                        { "date": "2024-06-01T13:00:00Z", "water_level": 0.4, "datum": "mean_sea_level" },
                        { "date": "2024-06-01T13:06:00Z", "water_level": 0.45, "datum": "mean_sea_level" },
                        { "date": "2024-06-01T14:00:00Z", "water_level": 0.58, "datum": "mean_sea_level" }
                    ]
                }
            }
        }
    ]"#;

    fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    fn window() -> TimeRange {
        TimeRange::days_from(Utc.with_ymd_and_hms(2024, 6, 1, 12, 30, 0).unwrap(), 2)
    }

    #[tokio::test]
    async fn test_directory_loads_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "buoys.json", BUOYS);
        let directory = SnapshotDirectory::new(&path, "buoy");

        assert!(directory.stations().is_empty());
        assert!(directory.fetch_stations().await.unwrap());
        assert_eq!(directory.len(), 2);

        // Later calls keep the loaded list even if the file goes away.
        std::fs::remove_file(&path).unwrap();
        assert!(directory.fetch_stations().await.unwrap());
        assert_eq!(directory.stations().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_file_is_unavailable() {
        let directory = SnapshotDirectory::new("/nonexistent/buoys.json", "buoy");
        assert!(!directory.fetch_stations().await.unwrap());
        assert!(!directory.is_loaded());
    }

    #[tokio::test]
    async fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "buoys.json", "{ not json");
        let directory = SnapshotDirectory::new(&path, "buoy");

        let err = directory.fetch_stations().await.unwrap_err();
        assert!(matches!(err, MarineError::UpstreamFailure(_)));
    }

    #[tokio::test]
    async fn test_station_defaults_and_filters() {
        let dir = tempfile::tempdir().unwrap();
        let directory = SnapshotDirectory::new(write_file(&dir, "buoys.json", BUOYS), "buoy");
        directory.fetch_stations().await.unwrap();

        let here = Location::new(41.43, -71.455).unwrap();
        let active = StationFilter {
            active_only: true,
            buoy_type: None,
        };
        let found = directory.find_closest_stations(&here, 5, &active);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].station.info().station_id, "44097");
        assert!(found[0].station.info().active);
    }

    #[tokio::test]
    async fn test_detailed_readings_truncated_and_latest_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let directory = SnapshotDirectory::new(write_file(&dir, "buoys.json", BUOYS), "buoy");
        directory.fetch_stations().await.unwrap();

        let station = directory.find_station("44097").unwrap();
        let readings = station.fetch_detailed_wave_reading(2).await.unwrap().unwrap();
        assert_eq!(readings.len(), 2);

        let latest = station.fetch_latest_reading().await.unwrap().unwrap();
        assert_eq!(latest.date, Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap());

        let quiet = directory.find_station("BUZM3").unwrap();
        assert!(quiet.fetch_detailed_wave_reading(5).await.unwrap().is_none());
        assert!(quiet.fetch_latest_reading().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_tide_data_windowed_by_range_and_interval() {
        let dir = tempfile::tempdir().unwrap();
        let directory = SnapshotDirectory::new(write_file(&dir, "tides.json", TIDES), "tide");
        directory.fetch_stations().await.unwrap();
        let station = directory.find_station("8452660").unwrap();

        let hourly = station
            .fetch_tide_data(&window(), Datum::MeanSeaLevel, TideInterval::Hourly)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(hourly.events.len(), 1);
        assert_eq!(hourly.predictions.len(), 2);

        let six_minute = station
            .fetch_tide_data(&window(), Datum::MeanSeaLevel, TideInterval::SixMinute)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(six_minute.predictions.len(), 3);

        let high_low = station
            .fetch_tide_data(&window(), Datum::MeanSeaLevel, TideInterval::HighLow)
            .await
            .unwrap()
            .unwrap();
        assert!(high_low.predictions.is_empty());
        assert_eq!(high_low.events.len(), 1);

        let missing = station
            .fetch_tide_data(&window(), Datum::MeanLowerLowWater, TideInterval::Hourly)
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_tide_data_outside_window_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let directory = SnapshotDirectory::new(write_file(&dir, "tides.json", TIDES), "tide");
        directory.fetch_stations().await.unwrap();
        let station = directory.find_station("8452660").unwrap();

        let later = TimeRange::days_from(window().start + Duration::days(30), 1);
        let bundle = station
            .fetch_tide_data(&later, Datum::MeanSeaLevel, TideInterval::Hourly)
            .await
            .unwrap()
            .unwrap();
        assert!(bundle.is_empty());
    }
}
