//! HTTP request handlers for the marine data API.
//!
//! This module is organized into submodules:
//! - `buoys`: nearby search, reading series and current conditions
//! - `forecast`: model wave forecasts and buoy forecasts
//! - `tides`: tides by location or station
//! - `docs`: static endpoint documentation
//! - `landing`: the root welcome document
//! - `health`: health, readiness and Prometheus metrics
//! - `cache`: memoizer statistics and clearing
//! - `common`: parameter parsing and error responses

pub mod buoys;
pub mod cache;
pub mod common;
pub mod docs;
pub mod forecast;
pub mod health;
pub mod landing;
pub mod tides;

pub use buoys::{current_handler, data_handler, nearby_handler};
pub use cache::{cache_clear_handler, cache_stats_handler};
pub use docs::{buoy_docs_handler, tide_docs_handler};
pub use forecast::{buoy_forecast_handler, location_forecast_handler};
pub use health::{health_handler, metrics_handler, ready_handler};
pub use landing::landing_handler;
pub use tides::{location_tides_handler, station_tides_handler};
