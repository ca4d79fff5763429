//! Route table for the marine data API.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::handlers;
use crate::state::AppState;

/// Every registered route as `(method, path)`, reported by the landing page.
pub const ROUTES: &[(&str, &str)] = &[
    ("GET", "/"),
    ("GET", "/health"),
    ("GET", "/ready"),
    ("GET", "/metrics"),
    ("GET", "/api/buoys/docs"),
    ("GET", "/api/buoys/nearby/:lat/:lon"),
    ("GET", "/api/buoys/:station_id/data"),
    ("GET", "/api/buoys/:station_id/current"),
    ("GET", "/api/forecast/:lat/:lon"),
    ("GET", "/api/forecast/buoy/:station_id"),
    ("GET", "/api/tides/docs"),
    ("GET", "/api/tides/location"),
    ("GET", "/api/tides/station/:station_id"),
    ("GET", "/api/cache/stats"),
    ("POST", "/api/cache/clear"),
];

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::landing_handler))
        .route("/health", get(handlers::health_handler))
        .route("/ready", get(handlers::ready_handler))
        .route("/metrics", get(handlers::metrics_handler))
        // Buoys
        .route("/api/buoys/docs", get(handlers::buoy_docs_handler))
        .route("/api/buoys/nearby/:lat/:lon", get(handlers::nearby_handler))
        .route("/api/buoys/:station_id/data", get(handlers::data_handler))
        .route("/api/buoys/:station_id/current", get(handlers::current_handler))
        // Forecasts
        .route(
            "/api/forecast/buoy/:station_id",
            get(handlers::buoy_forecast_handler),
        )
        .route(
            "/api/forecast/:lat/:lon",
            get(handlers::location_forecast_handler),
        )
        // Tides
        .route("/api/tides/docs", get(handlers::tide_docs_handler))
        .route("/api/tides/location", get(handlers::location_tides_handler))
        .route(
            "/api/tides/station/:station_id",
            get(handlers::station_tides_handler),
        )
        // Cache administration
        .route("/api/cache/stats", get(handlers::cache_stats_handler))
        .route("/api/cache/clear", post(handlers::cache_clear_handler))
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
