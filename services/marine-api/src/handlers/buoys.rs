//! Buoy lookup handlers.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::Response,
};
use marine_common::{MarineResult, StationFilter};

use super::common::{
    error_response, json_response, parse_count, parse_flag, parse_location, parse_station_id,
    NEARBY_COUNT_DEFAULT, NEARBY_COUNT_RANGE, READING_COUNT_DEFAULT, READING_COUNT_RANGE,
};
use crate::state::AppState;

/// GET /api/buoys/nearby/:lat/:lon
pub async fn nearby_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path((lat, lon)): Path<(String, String)>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let request = || -> MarineResult<_> {
        let location = parse_location(&lat, &lon)?;
        let count = parse_count(
            params.get("count").map(String::as_str),
            NEARBY_COUNT_DEFAULT,
            NEARBY_COUNT_RANGE,
        )?;
        let filter = StationFilter {
            active_only: parse_flag("active", params.get("active").map(String::as_str), true)?,
            buoy_type: params
                .get("type")
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
        };
        Ok((location, count, filter))
    };

    let (location, count, filter) = match request() {
        Ok(parsed) => parsed,
        Err(e) => return error_response(&e),
    };

    match state.gateway.nearby_buoys(location, count, filter).await {
        Ok(envelope) => json_response(StatusCode::OK, &envelope),
        Err(e) => error_response(&e),
    }
}

/// GET /api/buoys/:station_id/data
pub async fn data_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(station_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let request = || -> MarineResult<_> {
        let station_id = parse_station_id(&station_id)?;
        let count = parse_count(
            params.get("count").map(String::as_str),
            READING_COUNT_DEFAULT,
            READING_COUNT_RANGE,
        )?;
        Ok((station_id, count))
    };

    let (station_id, count) = match request() {
        Ok(parsed) => parsed,
        Err(e) => return error_response(&e),
    };

    match state.gateway.buoy_readings(&station_id, count).await {
        Ok(envelope) => json_response(StatusCode::OK, &envelope),
        Err(e) => error_response(&e),
    }
}

/// GET /api/buoys/:station_id/current
pub async fn current_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(station_id): Path<String>,
) -> Response {
    let station_id = match parse_station_id(&station_id) {
        Ok(id) => id,
        Err(e) => return error_response(&e),
    };

    match state.gateway.current_conditions(&station_id).await {
        Ok(conditions) => json_response(StatusCode::OK, &conditions),
        Err(e) => error_response(&e),
    }
}
