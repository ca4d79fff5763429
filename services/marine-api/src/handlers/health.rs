//! Health checks and Prometheus metrics.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use marine_common::FetchResult;
use serde::Serialize;
use station_cache::KeyedMemoizer;
use tracing::{instrument, warn};

use crate::state::AppState;

// ============================================================================
// Health Checks
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct StationCounts {
    pub buoys: usize,
    pub tides: usize,
}

#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    pub ready: bool,
    pub stations: StationCounts,
}

/// GET /health - Basic liveness check
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// GET /ready - Both station directories are loaded
pub async fn ready_handler(Extension(state): Extension<Arc<AppState>>) -> Response {
    let mut ready = true;
    for (kind, directory) in [("buoy", &state.buoys), ("tide", &state.tide_stations)] {
        match directory.fetch_stations().await {
            Ok(true) => {}
            Ok(false) => ready = false,
            Err(e) => {
                warn!("Readiness check failed for {} stations: {}", kind, e);
                ready = false;
            }
        }
    }

    let body = ReadyResponse {
        ready,
        stations: StationCounts {
            buoys: state.buoys.stations().len(),
            tides: state.tide_stations.stations().len(),
        },
    };

    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(body)).into_response()
}

// ============================================================================
// Prometheus Metrics
// ============================================================================

/// GET /metrics - Memoizer counters in Prometheus text format
#[instrument(skip(state))]
pub async fn metrics_handler(Extension(state): Extension<Arc<AppState>>) -> Response {
    let mut output = String::new();

    for cache in [&state.reading_cache, &state.tide_cache] {
        write_cache_metrics(&mut output, cache).await;
    }

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        output,
    )
        .into_response()
}

async fn write_cache_metrics(output: &mut String, cache: &KeyedMemoizer<FetchResult>) {
    let name = cache.name();
    let stats = cache.stats().snapshot();

    let counters = [
        ("hits", "Lookups answered from the cache", stats.hits),
        ("misses", "Lookups that ran the computation", stats.misses),
        ("coalesced", "Lookups that joined an in-flight computation", stats.coalesced),
        ("stores", "Results stored", stats.stores),
        ("empty_results", "Empty results not stored", stats.empty_results),
        ("failures", "Computations that failed", stats.failures),
        ("evictions", "Entries evicted by capacity", stats.evictions),
        ("expired", "Entries dropped after their TTL", stats.expired),
    ];

    for (metric, help, value) in counters {
        output.push_str(&format!(
            "# HELP {name}_{metric}_total {help}\n# TYPE {name}_{metric}_total counter\n{name}_{metric}_total {value}\n"
        ));
    }

    output.push_str(&format!(
        "# HELP {name}_entries Current cache entries\n# TYPE {name}_entries gauge\n{name}_entries {}\n",
        cache.len().await
    ));
    output.push_str(&format!(
        "# HELP {name}_capacity Maximum cache entries\n# TYPE {name}_capacity gauge\n{name}_capacity {}\n",
        cache.capacity()
    ));
}
