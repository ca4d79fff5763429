//! Station data gateway.
//!
//! Composes the station directories, wave models and memoizers into the
//! lookups the HTTP handlers need, and normalizes whatever the collaborators
//! return into response envelopes.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use marine_common::{
    Datum, FetchResult, Location, MarineError, MarineResult, ModelProvider, Station,
    StationDirectory, StationFilter, TideInterval, TimeRange,
};
use station_cache::{CacheKey, DatumFallbackResolver, KeyedMemoizer, ResolvedDatum};
use tracing::{debug, info, warn};

use crate::envelope::{
    BuoyReadingsEnvelope, CurrentConditions, ForecastStep, NearbyBuoy, NearbyEnvelope,
    NearbyRequest, ReadingBody, TideEnvelope, TideRequestBody, TideStationBody,
};

/// Wave model covering the US west coast.
pub const WEST_COAST_MODEL: &str = "us_west_coast";

/// Wave model used everywhere else.
pub const ATLANTIC_MODEL: &str = "atlantic";

/// Readings returned by the buoy forecast endpoint.
pub const BUOY_FORECAST_COUNT: usize = 20;

/// Pick the wave model for a location.
///
/// The west coast model covers absolute longitude 210-250 and latitude 25-50.
pub fn forecast_model_for(location: &Location) -> &'static str {
    let lon = location.absolute_longitude();
    if (210.0..=250.0).contains(&lon) && (25.0..=50.0).contains(&location.latitude) {
        WEST_COAST_MODEL
    } else {
        ATLANTIC_MODEL
    }
}

/// Lookup front-end over station directories, wave models and caches.
pub struct StationDataGateway {
    buoys: Arc<dyn StationDirectory>,
    tide_stations: Arc<dyn StationDirectory>,
    models: HashMap<String, Arc<dyn ModelProvider>>,
    readings: Arc<KeyedMemoizer<FetchResult>>,
    tides: DatumFallbackResolver,
    datum_preferences: Vec<Datum>,
    tide_interval: TideInterval,
}

impl StationDataGateway {
    pub fn new(
        buoys: Arc<dyn StationDirectory>,
        tide_stations: Arc<dyn StationDirectory>,
        readings: Arc<KeyedMemoizer<FetchResult>>,
        tides: Arc<KeyedMemoizer<FetchResult>>,
    ) -> Self {
        Self {
            buoys,
            tide_stations,
            models: HashMap::new(),
            readings,
            tides: DatumFallbackResolver::new(tides),
            datum_preferences: Datum::default_preferences(),
            tide_interval: TideInterval::default(),
        }
    }

    /// Register a wave model under its own name.
    pub fn with_model(mut self, model: Arc<dyn ModelProvider>) -> Self {
        self.models.insert(model.name().to_string(), model);
        self
    }

    pub fn with_datum_preferences(mut self, preferences: Vec<Datum>) -> Self {
        self.datum_preferences = preferences;
        self
    }

    pub fn with_tide_interval(mut self, interval: TideInterval) -> Self {
        self.tide_interval = interval;
        self
    }

    pub fn datum_preferences(&self) -> &[Datum] {
        &self.datum_preferences
    }

    pub fn model_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.models.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    // ========================================================================
    // Buoys
    // ========================================================================

    /// Closest buoys to `location` passing `filter`, nearest first.
    pub async fn nearby_buoys(
        &self,
        location: Location,
        count: usize,
        filter: StationFilter,
    ) -> MarineResult<NearbyEnvelope> {
        ensure_loaded(self.buoys.as_ref(), "buoy").await?;

        let stations: Vec<NearbyBuoy> = self
            .buoys
            .find_closest_stations(&location, count, &filter)
            .iter()
            .map(NearbyBuoy::from)
            .collect();

        debug!("Found {} buoys near {}", stations.len(), location);

        Ok(NearbyEnvelope {
            request: NearbyRequest {
                latitude: location.latitude,
                longitude: location.longitude,
                count,
                active: filter.active_only,
                buoy_type: filter.buoy_type,
            },
            stations,
        })
    }

    /// Up to `count` recent readings for a buoy.
    ///
    /// Prefers the detailed wave series and falls back to the single latest
    /// reading when the series is unavailable.
    pub async fn buoy_readings(
        &self,
        station_id: &str,
        count: usize,
    ) -> MarineResult<BuoyReadingsEnvelope> {
        let station = find_station(self.buoys.as_ref(), "buoy", station_id).await?;
        let station_id = station.info().station_id.clone();
        let key = CacheKey::new().with(station_id.as_str()).with(count);

        let result = self
            .readings
            .get_or_compute(key, move || fetch_readings(station, count))
            .await?;

        let readings = result
            .filter(|r| !r.is_empty())
            .map(FetchResult::into_readings)
            .ok_or_else(|| MarineError::NoDataAvailable(station_id.clone()))?;

        Ok(BuoyReadingsEnvelope {
            station_id,
            readings: readings.iter().map(ReadingBody::from).collect(),
        })
    }

    /// The latest standard reading for a buoy.
    pub async fn current_conditions(&self, station_id: &str) -> MarineResult<CurrentConditions> {
        let station = find_station(self.buoys.as_ref(), "buoy", station_id).await?;
        let station_id = station.info().station_id.clone();
        let key = CacheKey::new().with(station_id.as_str()).with("latest");

        let result = self
            .readings
            .get_or_compute(key, move || async move {
                Ok::<_, MarineError>(
                    station
                        .fetch_latest_reading()
                        .await?
                        .map(FetchResult::Reading),
                )
            })
            .await?;

        result
            .and_then(|r| r.into_readings().into_iter().next())
            .map(|reading| CurrentConditions::from(&reading))
            .ok_or(MarineError::NoDataAvailable(station_id))
    }

    /// The most recent detailed readings for a buoy, as forecast steps.
    pub async fn buoy_forecast(&self, station_id: &str) -> MarineResult<Vec<ForecastStep>> {
        let station = find_station(self.buoys.as_ref(), "buoy", station_id).await?;
        let station_id = station.info().station_id.clone();
        let key = CacheKey::new()
            .with(station_id.as_str())
            .with(BUOY_FORECAST_COUNT);

        let result = self
            .readings
            .get_or_compute(key, move || fetch_readings(station, BUOY_FORECAST_COUNT))
            .await?;

        let readings = result
            .filter(|r| !r.is_empty())
            .map(FetchResult::into_readings)
            .ok_or(MarineError::NoDataAvailable(station_id))?;

        Ok(readings.iter().map(ForecastStep::waves_only).collect())
    }

    // ========================================================================
    // Wave models
    // ========================================================================

    /// Model wave forecast at `location` for `days` days from `now`.
    pub async fn wave_forecast(
        &self,
        location: Location,
        days: u32,
        now: DateTime<Utc>,
    ) -> MarineResult<Vec<ForecastStep>> {
        let name = forecast_model_for(&location);
        let model = self.models.get(name).ok_or_else(|| {
            MarineError::UpstreamFailure(format!("Wave model {} is not available", name))
        })?;

        let start_index = model.time_index(now);
        let end_index = model.time_index(now + Duration::days(i64::from(days)));
        debug!(
            "Fetching {} model steps {}..={} for {}",
            name, start_index, end_index, location
        );

        let raw = model.fetch_grib_datas(start_index, end_index).await?;
        let parsed = model.parse_grib_datas(&location, &raw)?;
        let readings = model.to_buoy_data(parsed);

        Ok(readings.iter().map(ForecastStep::with_wind).collect())
    }

    // ========================================================================
    // Tides
    // ========================================================================

    /// Tides at the station closest to `location`.
    pub async fn tides_near(
        &self,
        location: Location,
        days: u32,
        datum: Option<Datum>,
        now: DateTime<Utc>,
    ) -> MarineResult<TideEnvelope> {
        ensure_loaded(self.tide_stations.as_ref(), "tide").await?;

        let nearby = self
            .tide_stations
            .find_closest_station(&location)
            .ok_or(MarineError::NoStationNearby {
                latitude: location.latitude,
                longitude: location.longitude,
            })?;

        info!(
            "Nearest tide station to {} is {} ({:.1} km)",
            location,
            nearby.station.info().station_id,
            nearby.distance_km
        );

        let range = TimeRange::days_from(now, days);
        let resolved = self.resolve_tides(&nearby.station, &range, datum).await?;

        Ok(tide_envelope(
            TideStationBody::new(nearby.station.info(), Some(nearby.distance_km)),
            TideRequestBody::new(Some(&location), days, resolved.datum, &range),
            resolved,
        ))
    }

    /// Tides at a station named by id.
    pub async fn tides_for_station(
        &self,
        station_id: &str,
        days: u32,
        datum: Option<Datum>,
        now: DateTime<Utc>,
    ) -> MarineResult<TideEnvelope> {
        let station = find_station(self.tide_stations.as_ref(), "tide", station_id).await?;

        let range = TimeRange::days_from(now, days);
        let resolved = self.resolve_tides(&station, &range, datum).await?;

        Ok(tide_envelope(
            TideStationBody::new(station.info(), None),
            TideRequestBody::new(None, days, resolved.datum, &range),
            resolved,
        ))
    }

    async fn resolve_tides(
        &self,
        station: &Arc<dyn Station>,
        range: &TimeRange,
        datum: Option<Datum>,
    ) -> MarineResult<ResolvedDatum> {
        let preferences = match datum {
            Some(datum) => vec![datum],
            None => self.datum_preferences.clone(),
        };
        let station_id = station.info().station_id.clone();
        let interval = self.tide_interval;
        let window = *range;

        let resolved = self
            .tides
            .resolve(&station_id, range, &preferences, |datum| {
                let station = Arc::clone(station);
                async move {
                    Ok::<_, MarineError>(
                        station
                            .fetch_tide_data(&window, datum, interval)
                            .await?
                            .map(FetchResult::TideBundle),
                    )
                }
            })
            .await?;

        resolved.ok_or(MarineError::TideDataUnavailable(station_id))
    }
}

fn tide_envelope(
    station: TideStationBody,
    request: TideRequestBody,
    resolved: ResolvedDatum,
) -> TideEnvelope {
    let bundle = resolved.result.into_tide_bundle().unwrap_or_default();
    TideEnvelope::new(station, request, bundle)
}

/// Refresh a directory's station list.
async fn ensure_loaded(directory: &dyn StationDirectory, kind: &str) -> MarineResult<()> {
    if directory.fetch_stations().await? {
        Ok(())
    } else {
        warn!("Failed to fetch {} stations", kind);
        Err(MarineError::UpstreamFailure(format!(
            "Failed to fetch {} stations",
            kind
        )))
    }
}

async fn find_station(
    directory: &dyn StationDirectory,
    kind: &str,
    station_id: &str,
) -> MarineResult<Arc<dyn Station>> {
    ensure_loaded(directory, kind).await?;
    directory
        .find_station(station_id)
        .ok_or_else(|| MarineError::StationNotFound(station_id.to_string()))
}

/// Detailed series first, then the single latest reading.
async fn fetch_readings(
    station: Arc<dyn Station>,
    count: usize,
) -> MarineResult<Option<FetchResult>> {
    let station_id = &station.info().station_id;

    match station.fetch_detailed_wave_reading(count).await {
        Ok(Some(readings)) if !readings.is_empty() => {
            return Ok(Some(FetchResult::ReadingSeries(readings)));
        }
        Ok(_) => debug!("No detailed wave data for {}, using latest reading", station_id),
        Err(e) => warn!(
            "Detailed wave fetch for {} failed, using latest reading: {}",
            station_id, e
        ),
    }

    Ok(station
        .fetch_latest_reading()
        .await?
        .map(FetchResult::Reading))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use test_utils::{
        create_reading, create_reading_series, create_station_info, create_tide_bundle,
        fixtures::{locations, time::reference_time},
        location_north_of, StubDirectory, StubModel, StubStation,
    };

    fn memo(name: &str) -> Arc<KeyedMemoizer<FetchResult>> {
        Arc::new(KeyedMemoizer::new(name, 16, None))
    }

    fn gateway(buoys: StubDirectory, tides: StubDirectory) -> StationDataGateway {
        StationDataGateway::new(
            Arc::new(buoys),
            Arc::new(tides),
            memo("readings"),
            memo("tides"),
        )
    }

    fn newport() -> Location {
        Location::new(locations::NEWPORT.0, locations::NEWPORT.1).unwrap()
    }

    #[test]
    fn test_forecast_model_selection() {
        let monterey = Location::new(locations::MONTEREY.0, locations::MONTEREY.1).unwrap();
        let pacific = Location::new(locations::MID_PACIFIC.0, locations::MID_PACIFIC.1).unwrap();

        assert_eq!(forecast_model_for(&monterey), WEST_COAST_MODEL);
        assert_eq!(forecast_model_for(&newport()), ATLANTIC_MODEL);
        assert_eq!(forecast_model_for(&pacific), ATLANTIC_MODEL);
        // Box edges are inclusive: -150 is 210 absolute.
        assert_eq!(
            forecast_model_for(&Location::new(25.0, -150.0).unwrap()),
            WEST_COAST_MODEL
        );
    }

    #[tokio::test]
    async fn test_buoy_readings_cached_per_count() {
        let station = StubStation::new(create_station_info("44097", 41.0, -71.0))
            .with_detailed(create_reading_series(reference_time(), 30))
            .into_arc();
        let gateway = gateway(StubDirectory::new(vec![station.clone()]), StubDirectory::empty());

        let first = gateway.buoy_readings("44097", 5).await.unwrap();
        let second = gateway.buoy_readings("44097", 5).await.unwrap();
        let other = gateway.buoy_readings("44097", 10).await.unwrap();

        assert_eq!(first.readings.len(), 5);
        assert_eq!(second.readings, first.readings);
        assert_eq!(other.readings.len(), 10);
        assert_eq!(station.detailed_calls(), 2);
        assert_eq!(station.latest_calls(), 0);
    }

    #[tokio::test]
    async fn test_buoy_readings_fall_back_to_latest() {
        let station = StubStation::new(create_station_info("44097", 41.0, -71.0))
            .with_detailed_error(MarineError::UpstreamFailure("no spectral file".into()))
            .with_latest(create_reading(reference_time(), 0))
            .into_arc();
        let gateway = gateway(StubDirectory::new(vec![station.clone()]), StubDirectory::empty());

        let envelope = gateway.buoy_readings("44097", 20).await.unwrap();

        assert_eq!(envelope.station_id, "44097");
        assert_eq!(envelope.readings.len(), 1);
        assert_eq!(station.latest_calls(), 1);
    }

    #[tokio::test]
    async fn test_buoy_readings_no_data_is_not_cached() {
        let station = StubStation::new(create_station_info("44097", 41.0, -71.0)).into_arc();
        let gateway = gateway(StubDirectory::new(vec![station.clone()]), StubDirectory::empty());

        for _ in 0..2 {
            let err = gateway.buoy_readings("44097", 20).await.unwrap_err();
            assert_eq!(err, MarineError::NoDataAvailable("44097".into()));
        }
        assert_eq!(station.detailed_calls(), 2);
        assert_eq!(station.latest_calls(), 2);
    }

    #[tokio::test]
    async fn test_unknown_station() {
        let gateway = gateway(StubDirectory::empty(), StubDirectory::empty());
        let err = gateway.buoy_readings("nope", 20).await.unwrap_err();
        assert_eq!(err, MarineError::StationNotFound("nope".into()));
    }

    #[tokio::test]
    async fn test_directory_unavailable() {
        let gateway = gateway(StubDirectory::empty().unavailable(), StubDirectory::empty());
        let err = gateway
            .nearby_buoys(newport(), 5, StationFilter::default())
            .await
            .unwrap_err();
        assert!(matches!(err, MarineError::UpstreamFailure(_)));
    }

    #[tokio::test]
    async fn test_current_conditions_cached() {
        let station = StubStation::new(create_station_info("44097", 41.0, -71.0))
            .with_latest(create_reading(reference_time(), 2))
            .into_arc();
        let gateway = gateway(StubDirectory::new(vec![station.clone()]), StubDirectory::empty());

        let current = gateway.current_conditions("44097").await.unwrap();
        gateway.current_conditions("44097").await.unwrap();

        assert_eq!(current.wind_speed, Some(7.0));
        assert_eq!(station.latest_calls(), 1);
    }

    #[tokio::test]
    async fn test_buoy_forecast_uses_twenty_readings() {
        let station = StubStation::new(create_station_info("44097", 41.0, -71.0))
            .with_detailed(create_reading_series(reference_time(), 48))
            .into_arc();
        let gateway = gateway(StubDirectory::new(vec![station.clone()]), StubDirectory::empty());

        let steps = gateway.buoy_forecast("44097").await.unwrap();
        assert_eq!(steps.len(), 20);
        assert!(steps.iter().all(|s| s.wind.is_none()));

        // Shares the cache entry with /data?count=20
        gateway.buoy_readings("44097", 20).await.unwrap();
        assert_eq!(station.detailed_calls(), 1);
    }

    #[tokio::test]
    async fn test_wave_forecast_uses_selected_model() {
        let now = reference_time();
        let atlantic = Arc::new(StubModel::new(ATLANTIC_MODEL, now - Duration::hours(6)));
        let west = Arc::new(StubModel::new(WEST_COAST_MODEL, now));
        let gateway = gateway(StubDirectory::empty(), StubDirectory::empty())
            .with_model(atlantic.clone())
            .with_model(west.clone());

        let steps = gateway.wave_forecast(newport(), 1, now).await.unwrap();

        assert_eq!(atlantic.fetched_ranges(), vec![(6, 30)]);
        assert_eq!(west.fetch_calls(), 0);
        assert_eq!(steps.len(), 25);
        assert!(steps[0].wind.is_some());
        assert_eq!(gateway.model_names(), vec![ATLANTIC_MODEL, WEST_COAST_MODEL]);
    }

    #[tokio::test]
    async fn test_wave_forecast_missing_model() {
        let gateway = gateway(StubDirectory::empty(), StubDirectory::empty());
        let err = gateway
            .wave_forecast(newport(), 3, reference_time())
            .await
            .unwrap_err();
        assert!(matches!(err, MarineError::UpstreamFailure(_)));
    }

    #[tokio::test]
    async fn test_tides_near_falls_back_through_preferences() {
        let now = reference_time();
        let (lat, lon) = location_north_of(locations::NEWPORT, 2.0);
        let station = StubStation::new(create_station_info("8452660", lat, lon))
            .with_tides(
                Datum::MeanSeaLevel,
                create_tide_bundle(Datum::MeanSeaLevel, now, 4, 24),
            )
            .with_tides(
                Datum::MeanTideLevel,
                create_tide_bundle(Datum::MeanTideLevel, now, 1, 1),
            )
            .into_arc();
        let gateway = gateway(StubDirectory::empty(), StubDirectory::new(vec![station.clone()]));

        let envelope = gateway.tides_near(newport(), 3, None, now).await.unwrap();

        assert_eq!(envelope.request.datum, Datum::MeanSeaLevel);
        assert_eq!(envelope.tides.len(), 4);
        assert_eq!(envelope.predictions.len(), 24);
        assert!((envelope.station.distance_km.unwrap() - 2.0).abs() < 0.01);
        assert_eq!(
            station.tide_datums(),
            vec![Datum::MeanLowerLowWater, Datum::MeanSeaLevel]
        );
    }

    #[tokio::test]
    async fn test_station_path_uses_same_preferences() {
        let now = reference_time();
        let station = StubStation::new(create_station_info("8452660", 41.5, -71.3))
            .with_tides(
                Datum::MeanTideLevel,
                create_tide_bundle(Datum::MeanTideLevel, now, 2, 2),
            )
            .into_arc();
        let gateway = gateway(StubDirectory::empty(), StubDirectory::new(vec![station.clone()]));

        let envelope = gateway
            .tides_for_station("8452660", 2, None, now)
            .await
            .unwrap();

        assert_eq!(envelope.request.datum, Datum::MeanTideLevel);
        assert!(envelope.station.distance_km.is_none());
        assert!(envelope.request.latitude.is_none());
        assert_eq!(station.tide_calls(), 3);
    }

    #[tokio::test]
    async fn test_pinned_datum_skips_preferences() {
        let now = reference_time();
        let station = StubStation::new(create_station_info("8452660", 41.5, -71.3))
            .with_tides(
                Datum::MeanLowerLowWater,
                create_tide_bundle(Datum::MeanLowerLowWater, now, 2, 2),
            )
            .into_arc();
        let gateway = gateway(StubDirectory::empty(), StubDirectory::new(vec![station.clone()]));

        let err = gateway
            .tides_for_station("8452660", 2, Some(Datum::MeanHighWater), now)
            .await
            .unwrap_err();

        assert_eq!(err, MarineError::TideDataUnavailable("8452660".into()));
        assert_eq!(station.tide_datums(), vec![Datum::MeanHighWater]);
    }

    #[tokio::test]
    async fn test_tide_results_cached_within_the_hour() {
        let station = StubStation::new(create_station_info("8452660", 41.5, -71.3))
            .with_tides(
                Datum::MeanLowerLowWater,
                create_tide_bundle(Datum::MeanLowerLowWater, reference_time(), 2, 2),
            )
            .into_arc();
        let gateway = gateway(StubDirectory::empty(), StubDirectory::new(vec![station.clone()]));

        let early = Utc.with_ymd_and_hms(2024, 6, 1, 12, 5, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 6, 1, 12, 55, 0).unwrap();
        let next_hour = Utc.with_ymd_and_hms(2024, 6, 1, 13, 5, 0).unwrap();

        gateway.tides_for_station("8452660", 3, None, early).await.unwrap();
        gateway.tides_for_station("8452660", 3, None, late).await.unwrap();
        assert_eq!(station.tide_calls(), 1);

        gateway
            .tides_for_station("8452660", 3, None, next_hour)
            .await
            .unwrap();
        assert_eq!(station.tide_calls(), 2);
    }

    #[tokio::test]
    async fn test_no_tide_station_nearby() {
        let gateway = gateway(StubDirectory::empty(), StubDirectory::empty());
        let err = gateway
            .tides_near(newport(), 3, None, reference_time())
            .await
            .unwrap_err();
        assert!(matches!(err, MarineError::NoStationNearby { .. }));
    }
}
