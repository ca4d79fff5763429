//! Cache inspection and management handlers.

use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use marine_common::FetchResult;
use serde::Serialize;
use station_cache::{KeyedMemoizer, StatsSnapshot};
use tracing::{info, instrument};

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CacheReport {
    pub name: String,
    pub entries: usize,
    pub capacity: usize,
    pub in_flight: usize,
    pub ttl_secs: Option<u64>,
    pub stats: StatsSnapshot,
}

impl CacheReport {
    async fn collect(cache: &KeyedMemoizer<FetchResult>) -> Self {
        Self {
            name: cache.name().to_string(),
            entries: cache.len().await,
            capacity: cache.capacity(),
            in_flight: cache.in_flight().await,
            ttl_secs: cache.ttl().map(|ttl| ttl.as_secs()),
            stats: cache.stats().snapshot(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CacheStatsResponse {
    pub reading_cache: CacheReport,
    pub tide_cache: CacheReport,
}

/// GET /api/cache/stats - Entry counts and counters for each memoizer
#[instrument(skip(state))]
pub async fn cache_stats_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Json<CacheStatsResponse> {
    Json(CacheStatsResponse {
        reading_cache: CacheReport::collect(&state.reading_cache).await,
        tide_cache: CacheReport::collect(&state.tide_cache).await,
    })
}

/// POST /api/cache/clear - Drop every cached result
#[instrument(skip(state))]
pub async fn cache_clear_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> impl IntoResponse {
    info!("Clearing all caches");
    state.clear_caches().await;

    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "All caches cleared" })),
    )
}
