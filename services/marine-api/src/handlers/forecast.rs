//! Wave forecast handlers.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::Response,
};
use chrono::Utc;
use marine_common::MarineResult;

use super::common::{error_response, json_response, parse_days, parse_location, parse_station_id};
use crate::state::AppState;

/// GET /api/forecast/:lat/:lon
pub async fn location_forecast_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path((lat, lon)): Path<(String, String)>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let request = || -> MarineResult<_> {
        let location = parse_location(&lat, &lon)?;
        let days = parse_days(params.get("days").map(String::as_str))?;
        Ok((location, days))
    };

    let (location, days) = match request() {
        Ok(parsed) => parsed,
        Err(e) => return error_response(&e),
    };

    match state.gateway.wave_forecast(location, days, Utc::now()).await {
        Ok(steps) => json_response(StatusCode::OK, &steps),
        Err(e) => error_response(&e),
    }
}

/// GET /api/forecast/buoy/:station_id
pub async fn buoy_forecast_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(station_id): Path<String>,
) -> Response {
    let station_id = match parse_station_id(&station_id) {
        Ok(id) => id,
        Err(e) => return error_response(&e),
    };

    match state.gateway.buoy_forecast(&station_id).await {
        Ok(steps) => json_response(StatusCode::OK, &steps),
        Err(e) => error_response(&e),
    }
}
