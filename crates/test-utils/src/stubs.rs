//! Stub collaborators with call counters.
//!
//! Each stub answers from canned data and records how often it was asked, so
//! tests can assert that caching and validation keep upstream calls down.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use marine_common::{
    BuoyReading, Datum, Location, MarineError, MarineResult, ModelProvider, ModelRecord,
    ParsedModelData, Station, StationDirectory, StationInfo, Swell, TideBundle, TideInterval,
    TimeRange,
};

/// A station answering from canned readings and per-datum tide bundles.
pub struct StubStation {
    info: StationInfo,
    latest: MarineResult<Option<BuoyReading>>,
    detailed: MarineResult<Option<Vec<BuoyReading>>>,
    tides: HashMap<Datum, MarineResult<Option<TideBundle>>>,
    delay: Option<Duration>,
    latest_calls: AtomicUsize,
    detailed_calls: AtomicUsize,
    tide_datums: Mutex<Vec<Datum>>,
}

impl StubStation {
    /// A station with no data at all.
    pub fn new(info: StationInfo) -> Self {
        Self {
            info,
            latest: Ok(None),
            detailed: Ok(None),
            tides: HashMap::new(),
            delay: None,
            latest_calls: AtomicUsize::new(0),
            detailed_calls: AtomicUsize::new(0),
            tide_datums: Mutex::new(Vec::new()),
        }
    }

    pub fn with_latest(mut self, reading: BuoyReading) -> Self {
        self.latest = Ok(Some(reading));
        self
    }

    pub fn with_detailed(mut self, readings: Vec<BuoyReading>) -> Self {
        self.detailed = Ok(Some(readings));
        self
    }

    pub fn with_detailed_error(mut self, error: MarineError) -> Self {
        self.detailed = Err(error);
        self
    }

    pub fn with_tides(mut self, datum: Datum, bundle: TideBundle) -> Self {
        self.tides.insert(datum, Ok(Some(bundle)));
        self
    }

    pub fn with_tide_error(mut self, datum: Datum, error: MarineError) -> Self {
        self.tides.insert(datum, Err(error));
        self
    }

    /// Make every fetch take `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn latest_calls(&self) -> usize {
        self.latest_calls.load(Ordering::SeqCst)
    }

    pub fn detailed_calls(&self) -> usize {
        self.detailed_calls.load(Ordering::SeqCst)
    }

    pub fn tide_calls(&self) -> usize {
        self.tide_datums().len()
    }

    /// Datums asked for, in call order.
    pub fn tide_datums(&self) -> Vec<Datum> {
        self.tide_datums
            .lock()
            .map(|datums| datums.clone())
            .unwrap_or_default()
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl Station for StubStation {
    fn info(&self) -> &StationInfo {
        &self.info
    }

    async fn fetch_latest_reading(&self) -> MarineResult<Option<BuoyReading>> {
        self.latest_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        self.latest.clone()
    }

    async fn fetch_detailed_wave_reading(
        &self,
        count: usize,
    ) -> MarineResult<Option<Vec<BuoyReading>>> {
        self.detailed_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        self.detailed
            .clone()
            .map(|readings| readings.map(|r| r.into_iter().take(count).collect()))
    }

    async fn fetch_tide_data(
        &self,
        _range: &TimeRange,
        datum: Datum,
        _interval: TideInterval,
    ) -> MarineResult<Option<TideBundle>> {
        if let Ok(mut datums) = self.tide_datums.lock() {
            datums.push(datum);
        }
        self.pause().await;
        self.tides.get(&datum).cloned().unwrap_or(Ok(None))
    }
}

/// A directory over a fixed station list.
pub struct StubDirectory {
    stations: Vec<Arc<dyn Station>>,
    available: bool,
    fetch_calls: AtomicUsize,
    lookups: AtomicUsize,
}

impl StubDirectory {
    pub fn new(stations: Vec<Arc<dyn Station>>) -> Self {
        Self {
            stations,
            available: true,
            fetch_calls: AtomicUsize::new(0),
            lookups: AtomicUsize::new(0),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Make `fetch_stations` report that the listing could not be obtained.
    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    /// Number of times the station list was read.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    /// True if nothing has asked this directory anything.
    pub fn untouched(&self) -> bool {
        self.fetch_calls() == 0 && self.lookups() == 0
    }
}

#[async_trait]
impl StationDirectory for StubDirectory {
    async fn fetch_stations(&self) -> MarineResult<bool> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.available)
    }

    fn stations(&self) -> Vec<Arc<dyn Station>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.stations.clone()
    }
}

/// A wave model returning one record per hourly time step.
///
/// Record `i` has `wave_height = 1.0 + 0.1 * i`, `wave_period = 10`,
/// `wave_direction = 270`.
pub struct StubModel {
    name: String,
    epoch: DateTime<Utc>,
    fetch_calls: AtomicUsize,
    fetched_ranges: Mutex<Vec<(usize, usize)>>,
}

impl StubModel {
    /// `epoch` is the time of step 0.
    pub fn new(name: &str, epoch: DateTime<Utc>) -> Self {
        Self {
            name: name.to_string(),
            epoch,
            fetch_calls: AtomicUsize::new(0),
            fetched_ranges: Mutex::new(Vec::new()),
        }
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn fetched_ranges(&self) -> Vec<(usize, usize)> {
        self.fetched_ranges
            .lock()
            .map(|ranges| ranges.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ModelProvider for StubModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn time_index(&self, time: DateTime<Utc>) -> usize {
        usize::try_from((time - self.epoch).num_hours()).unwrap_or(0)
    }

    async fn fetch_grib_datas(
        &self,
        start_index: usize,
        end_index: usize,
    ) -> MarineResult<Vec<Bytes>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut ranges) = self.fetched_ranges.lock() {
            ranges.push((start_index, end_index));
        }
        Ok((start_index..=end_index)
            .map(|i| Bytes::from(i.to_string()))
            .collect())
    }

    fn parse_grib_datas(&self, location: &Location, data: &[Bytes]) -> MarineResult<ParsedModelData> {
        let records = data
            .iter()
            .map(|message| {
                let step: i64 = std::str::from_utf8(message)
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .ok_or_else(|| MarineError::UpstreamFailure("bad model message".into()))?;
                let values = [
                    ("wave_height".to_string(), 1.0 + 0.1 * step as f64),
                    ("wave_period".to_string(), 10.0),
                    ("wave_direction".to_string(), 270.0),
                ]
                .into_iter()
                .collect();
                Ok(ModelRecord {
                    date: self.epoch + chrono::Duration::hours(step),
                    values,
                })
            })
            .collect::<MarineResult<Vec<_>>>()?;

        Ok(ParsedModelData {
            grid_location: *location,
            records,
        })
    }

    fn to_buoy_data(&self, parsed: ParsedModelData) -> Vec<BuoyReading> {
        parsed
            .records
            .into_iter()
            .map(|record| {
                let mut reading = BuoyReading::at(record.date);
                if let (Some(height), Some(period)) =
                    (record.value("wave_height"), record.value("wave_period"))
                {
                    reading.wave_summary = Some(Swell {
                        wave_height: height,
                        period,
                        direction: record.value("wave_direction"),
                    });
                }
                reading
            })
            .collect()
    }
}
