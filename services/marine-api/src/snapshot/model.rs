//! File-backed wave models.
//!
//! A model file holds gridded point values for a run of evenly spaced time
//! steps. Each step is served as one opaque message, so the fetch/parse split
//! matches a real model archive.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use marine_common::{
    BuoyReading, Location, MarineError, MarineResult, ModelProvider, ModelRecord,
    ParsedModelData, Swell,
};
use serde::{Deserialize, Serialize};

/// Swell partitions read from model values (`swell_1_height`, ...).
const SWELL_PARTITIONS: usize = 3;

#[derive(Debug, Deserialize)]
struct ModelFile {
    name: String,
    /// Valid time of step 0.
    epoch: DateTime<Utc>,
    #[serde(default = "default_step_hours")]
    step_hours: u32,
    steps: Vec<ModelStep>,
}

fn default_step_hours() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ModelStep {
    date: DateTime<Utc>,
    points: Vec<GridPoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GridPoint {
    location: Location,
    values: BTreeMap<String, f64>,
}

/// A wave model answering from an exported run.
#[derive(Debug)]
pub struct SnapshotModel {
    name: String,
    epoch: DateTime<Utc>,
    step_hours: u32,
    steps: Vec<ModelStep>,
}

impl SnapshotModel {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read: {:?}", path))?;
        let file: ModelFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse: {:?}", path))?;

        Ok(Self {
            name: file.name,
            epoch: file.epoch,
            step_hours: file.step_hours.max(1),
            steps: file.steps,
        })
    }

    /// Load every `*.json` model in `dir`. A missing directory yields none.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Vec<Self>> {
        let dir = dir.as_ref();

        if !dir.exists() {
            tracing::warn!("Model directory {:?} does not exist, no wave models loaded", dir);
            return Ok(Vec::new());
        }

        let mut models = Vec::new();
        for entry in
            std::fs::read_dir(dir).with_context(|| format!("Failed to read directory: {:?}", dir))?
        {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                let model = Self::load(&path)?;
                tracing::info!(
                    "Loaded wave model {} ({} steps) from {:?}",
                    model.name,
                    model.steps.len(),
                    path
                );
                models.push(model);
            }
        }

        Ok(models)
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }
}

#[async_trait]
impl ModelProvider for SnapshotModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn time_index(&self, time: DateTime<Utc>) -> usize {
        let hours = (time - self.epoch).num_hours().max(0);
        usize::try_from(hours / i64::from(self.step_hours)).unwrap_or(0)
    }

    async fn fetch_grib_datas(
        &self,
        start_index: usize,
        end_index: usize,
    ) -> MarineResult<Vec<Bytes>> {
        if start_index >= self.steps.len() || start_index > end_index {
            return Ok(Vec::new());
        }
        let end = end_index.min(self.steps.len() - 1);

        self.steps[start_index..=end]
            .iter()
            .map(|step| -> MarineResult<Bytes> { Ok(Bytes::from(serde_json::to_vec(step)?)) })
            .collect()
    }

    fn parse_grib_datas(&self, location: &Location, data: &[Bytes]) -> MarineResult<ParsedModelData> {
        let mut grid_location = *location;
        let mut records = Vec::with_capacity(data.len());

        for message in data {
            let step: ModelStep = serde_json::from_slice(message).map_err(|e| {
                MarineError::UpstreamFailure(format!("Malformed {} model message: {}", self.name, e))
            })?;

            let nearest = step.points.into_iter().min_by(|a, b| {
                location
                    .distance_km(&a.location)
                    .total_cmp(&location.distance_km(&b.location))
            });

            if let Some(point) = nearest {
                grid_location = point.location;
                records.push(ModelRecord {
                    date: step.date,
                    values: point.values,
                });
            }
        }

        Ok(ParsedModelData {
            grid_location,
            records,
        })
    }

    fn to_buoy_data(&self, parsed: ParsedModelData) -> Vec<BuoyReading> {
        parsed.records.iter().map(record_to_reading).collect()
    }
}

fn swell_from(record: &ModelRecord, prefix: &str) -> Option<Swell> {
    let height = record.value(&format!("{}_height", prefix))?;
    let period = record.value(&format!("{}_period", prefix))?;
    Some(Swell {
        wave_height: height,
        period,
        direction: record.value(&format!("{}_direction", prefix)),
    })
}

fn record_to_reading(record: &ModelRecord) -> BuoyReading {
    let mut reading = BuoyReading::at(record.date);
    reading.wave_summary = swell_from(record, "wave");
    reading.swell_components = (1..=SWELL_PARTITIONS)
        .filter_map(|n| swell_from(record, &format!("swell_{}", n)))
        .collect();
    reading.wind_speed = record.value("wind_speed");
    reading.wind_direction = record.value("wind_direction");
    reading.wind_gust = record.value("wind_gust");
    reading
}
