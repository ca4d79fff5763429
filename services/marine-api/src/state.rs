//! Application state for the marine API.

use std::sync::Arc;

use anyhow::Result;
use marine_common::{FetchResult, ModelProvider, StationDirectory};
use station_cache::KeyedMemoizer;

use crate::config::MarineConfig;
use crate::gateway::StationDataGateway;
use crate::snapshot::SnapshotBackend;

/// Shared application state.
///
/// Owns the memoizers explicitly so they can be sized from config, inspected
/// and cleared through the admin endpoints.
pub struct AppState {
    pub config: MarineConfig,

    /// Lookup front-end used by the data handlers.
    pub gateway: StationDataGateway,

    /// Buoy reading results, keyed by station and count.
    pub reading_cache: Arc<KeyedMemoizer<FetchResult>>,

    /// Tide results, keyed by station, window and datum.
    pub tide_cache: Arc<KeyedMemoizer<FetchResult>>,

    pub buoys: Arc<dyn StationDirectory>,
    pub tide_stations: Arc<dyn StationDirectory>,
}

impl AppState {
    /// Build state backed by the snapshot files named in `config`.
    pub fn new(config: MarineConfig) -> Result<Self> {
        let backend = SnapshotBackend::open(&config.data.snapshot_dir)?;

        let models = backend
            .models
            .iter()
            .map(|m| Arc::clone(m) as Arc<dyn ModelProvider>)
            .collect();

        Ok(Self::with_collaborators(
            config,
            backend.buoys,
            backend.tide_stations,
            models,
        ))
    }

    /// Build state around arbitrary collaborators.
    pub fn with_collaborators(
        config: MarineConfig,
        buoys: Arc<dyn StationDirectory>,
        tide_stations: Arc<dyn StationDirectory>,
        models: Vec<Arc<dyn ModelProvider>>,
    ) -> Self {
        let ttl = config.cache.ttl();
        let reading_cache = Arc::new(KeyedMemoizer::new(
            "reading_cache",
            config.cache.reading_capacity,
            ttl,
        ));
        let tide_cache = Arc::new(KeyedMemoizer::new(
            "tide_cache",
            config.cache.tide_capacity,
            ttl,
        ));

        let gateway = models.into_iter().fold(
            StationDataGateway::new(
                Arc::clone(&buoys),
                Arc::clone(&tide_stations),
                Arc::clone(&reading_cache),
                Arc::clone(&tide_cache),
            )
            .with_datum_preferences(config.tides.datum_preferences.clone())
            .with_tide_interval(config.tides.interval),
            |gateway, model| gateway.with_model(model),
        );

        tracing::info!(
            "Gateway ready: datums={:?}, models={:?}",
            gateway.datum_preferences(),
            gateway.model_names()
        );

        Self {
            config,
            gateway,
            reading_cache,
            tide_cache,
            buoys,
            tide_stations,
        }
    }

    /// Drop every cached result.
    pub async fn clear_caches(&self) {
        self.reading_cache.clear().await;
        self.tide_cache.clear().await;
    }
}
