//! Collaborator traits for station directories, stations and wave models.
//!
//! These abstract over whatever actually talks to buoy networks, tide
//! services and wave model archives. The service only calls them; it never
//! looks inside.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::MarineResult;
use crate::location::Location;
use crate::reading::BuoyReading;
use crate::station::{StationFilter, StationInfo};
use crate::tide::{Datum, TideBundle, TideInterval};
use crate::time::TimeRange;

/// A single observation station.
#[async_trait]
pub trait Station: Send + Sync {
    /// Station metadata.
    fn info(&self) -> &StationInfo;

    /// Most recent standard meteorological reading.
    ///
    /// Returns `Ok(None)` if the station has nothing to report.
    async fn fetch_latest_reading(&self) -> MarineResult<Option<BuoyReading>>;

    /// Up to `count` recent readings with spectral wave detail, newest first.
    async fn fetch_detailed_wave_reading(
        &self,
        count: usize,
    ) -> MarineResult<Option<Vec<BuoyReading>>>;

    /// Tide events and predictions for `range` measured against `datum`.
    async fn fetch_tide_data(
        &self,
        range: &TimeRange,
        datum: Datum,
        interval: TideInterval,
    ) -> MarineResult<Option<TideBundle>>;
}

/// A station paired with its distance from a query location.
#[derive(Clone)]
pub struct NearbyStation {
    pub station: Arc<dyn Station>,
    pub distance_km: f64,
}

/// A searchable collection of stations.
#[async_trait]
pub trait StationDirectory: Send + Sync {
    /// Load (or refresh) the station list.
    ///
    /// Returns `Ok(false)` if the upstream listing could not be obtained.
    async fn fetch_stations(&self) -> MarineResult<bool>;

    /// All currently known stations.
    fn stations(&self) -> Vec<Arc<dyn Station>>;

    /// Look up a station by its identifier.
    fn find_station(&self, station_id: &str) -> Option<Arc<dyn Station>> {
        self.stations()
            .into_iter()
            .find(|s| s.info().station_id.eq_ignore_ascii_case(station_id))
    }

    /// The `count` stations closest to `location` that pass `filter`,
    /// nearest first.
    fn find_closest_stations(
        &self,
        location: &Location,
        count: usize,
        filter: &StationFilter,
    ) -> Vec<NearbyStation> {
        let mut nearby: Vec<NearbyStation> = self
            .stations()
            .into_iter()
            .filter(|s| filter.matches(s.info()))
            .map(|station| {
                let distance_km = location.distance_km(&station.info().location);
                NearbyStation {
                    station,
                    distance_km,
                }
            })
            .collect();

        nearby.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        nearby.truncate(count);
        nearby
    }

    /// The single closest station, regardless of status or type.
    fn find_closest_station(&self, location: &Location) -> Option<NearbyStation> {
        self.find_closest_stations(location, 1, &StationFilter::default())
            .into_iter()
            .next()
    }
}

/// Values extracted from one model time step at one grid point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRecord {
    pub date: DateTime<Utc>,
    /// Variable name to value, e.g. "wave_height" → 1.8.
    pub values: BTreeMap<String, f64>,
}

impl ModelRecord {
    pub fn value(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }
}

/// Model output at the grid point nearest a query location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedModelData {
    /// The grid point the values were taken from.
    pub grid_location: Location,
    pub records: Vec<ModelRecord>,
}

/// A wave model whose output is fetched as per-time-step messages.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Model identifier, e.g. "atlantic".
    fn name(&self) -> &str;

    /// Index of the model time step covering `time`.
    fn time_index(&self, time: DateTime<Utc>) -> usize;

    /// Raw messages for time steps `start_index..=end_index`.
    async fn fetch_grib_datas(&self, start_index: usize, end_index: usize)
        -> MarineResult<Vec<Bytes>>;

    /// Extract the values nearest `location` from raw messages.
    fn parse_grib_datas(&self, location: &Location, data: &[Bytes])
        -> MarineResult<ParsedModelData>;

    /// Convert parsed model values into buoy-style readings.
    fn to_buoy_data(&self, parsed: ParsedModelData) -> Vec<BuoyReading>;
}
