//! Tide handlers.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::Response,
};
use chrono::Utc;
use marine_common::MarineResult;

use super::common::{
    error_response, json_response, parse_datum, parse_days, parse_location, parse_station_id,
    require,
};
use crate::state::AppState;

fn param<'a>(params: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    params.get(name).map(String::as_str)
}

/// GET /api/tides/location?lat=..&lon=..
pub async fn location_tides_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let request = || -> MarineResult<_> {
        let lat = require("lat", param(&params, "lat"))?;
        let lon = require("lon", param(&params, "lon"))?;
        let location = parse_location(lat, lon)?;
        let days = parse_days(param(&params, "days"))?;
        let datum = parse_datum(param(&params, "datum"))?;
        Ok((location, days, datum))
    };

    let (location, days, datum) = match request() {
        Ok(parsed) => parsed,
        Err(e) => return error_response(&e),
    };

    match state
        .gateway
        .tides_near(location, days, datum, Utc::now())
        .await
    {
        Ok(envelope) => json_response(StatusCode::OK, &envelope),
        Err(e) => error_response(&e),
    }
}

/// GET /api/tides/station/:station_id
pub async fn station_tides_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(station_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let request = || -> MarineResult<_> {
        let station_id = parse_station_id(&station_id)?;
        let days = parse_days(param(&params, "days"))?;
        let datum = parse_datum(param(&params, "datum"))?;
        Ok((station_id, days, datum))
    };

    let (station_id, days, datum) = match request() {
        Ok(parsed) => parsed,
        Err(e) => return error_response(&e),
    };

    match state
        .gateway
        .tides_for_station(&station_id, days, datum, Utc::now())
        .await
    {
        Ok(envelope) => json_response(StatusCode::OK, &envelope),
        Err(e) => error_response(&e),
    }
}
