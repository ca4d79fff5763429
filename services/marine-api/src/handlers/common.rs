//! Common utilities shared across handlers.

use std::ops::RangeInclusive;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use marine_common::{Datum, Location, MarineError, MarineResult};
use serde::Serialize;

/// `count` for nearby buoy searches.
pub const NEARBY_COUNT_DEFAULT: usize = 5;
pub const NEARBY_COUNT_RANGE: RangeInclusive<usize> = 1..=10;

/// `count` for buoy reading series.
pub const READING_COUNT_DEFAULT: usize = 20;
pub const READING_COUNT_RANGE: RangeInclusive<usize> = 1..=50;

/// `days` for forecasts and tides.
pub const DAYS_DEFAULT: u32 = 3;
pub const DAYS_RANGE: RangeInclusive<u32> = 1..=10;

// ============================================================================
// Response Helpers
// ============================================================================

/// Serialize `body` as a JSON response.
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response {
    match serde_json::to_string(body) {
        Ok(json) => (status, [(header::CONTENT_TYPE, "application/json")], json).into_response(),
        Err(e) => {
            tracing::error!("Failed to serialize response: {}", e);
            error_response(&MarineError::Internal(e.to_string()))
        }
    }
}

/// Map an error to its status code and JSON body.
pub fn error_response(err: &MarineError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    if status.is_server_error() {
        tracing::error!("Request failed: {}", err);
    } else {
        tracing::debug!("Request rejected: {}", err);
    }

    let json = serde_json::to_string(&err.to_body())
        .unwrap_or_else(|_| r#"{"error":"Server error"}"#.to_string());
    (status, [(header::CONTENT_TYPE, "application/json")], json).into_response()
}

// ============================================================================
// Parameter Parsing
// ============================================================================

/// Return a required parameter or `MissingParameter`.
pub fn require<'a>(name: &str, value: Option<&'a str>) -> MarineResult<&'a str> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(MarineError::MissingParameter(name.to_string())),
    }
}

/// Parse a decimal coordinate component.
pub fn parse_coordinate(name: &str, raw: &str) -> MarineResult<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| MarineError::invalid_parameter(name, format!("'{}' is not a number", raw)))
}

/// Parse and range-check a latitude/longitude pair.
pub fn parse_location(lat: &str, lon: &str) -> MarineResult<Location> {
    let latitude = parse_coordinate("lat", lat)?;
    let longitude = parse_coordinate("lon", lon)?;
    Location::new(latitude, longitude)
}

fn parse_bounded<T>(name: &str, raw: Option<&str>, default: T, range: RangeInclusive<T>) -> MarineResult<T>
where
    T: std::str::FromStr + PartialOrd + std::fmt::Display + Copy,
{
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return Ok(default);
    };

    let value: T = raw.parse().map_err(|_| {
        MarineError::invalid_parameter(name, format!("'{}' is not a whole number", raw))
    })?;

    if !range.contains(&value) {
        return Err(MarineError::invalid_parameter(
            name,
            format!("must be between {} and {}", range.start(), range.end()),
        ));
    }

    Ok(value)
}

pub fn parse_count(
    raw: Option<&str>,
    default: usize,
    range: RangeInclusive<usize>,
) -> MarineResult<usize> {
    parse_bounded("count", raw, default, range)
}

pub fn parse_days(raw: Option<&str>) -> MarineResult<u32> {
    parse_bounded("days", raw, DAYS_DEFAULT, DAYS_RANGE)
}

/// Parse a boolean flag (`true`/`false`, `1`/`0`, `yes`/`no`).
pub fn parse_flag(name: &str, raw: Option<&str>, default: bool) -> MarineResult<bool> {
    match raw.map(|r| r.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") => Ok(default),
        Some("true" | "1" | "yes") => Ok(true),
        Some("false" | "0" | "no") => Ok(false),
        Some(other) => Err(MarineError::invalid_parameter(
            name,
            format!("'{}' is not a boolean", other),
        )),
    }
}

/// Parse an optional tide datum override.
pub fn parse_datum(raw: Option<&str>) -> MarineResult<Option<Datum>> {
    match raw.map(str::trim).filter(|r| !r.is_empty()) {
        Some(raw) => raw.parse().map(Some),
        None => Ok(None),
    }
}

/// Check a station identifier from the path.
pub fn parse_station_id(raw: &str) -> MarineResult<String> {
    let id = raw.trim();
    if id.is_empty() {
        return Err(MarineError::MissingParameter("station_id".to_string()));
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(MarineError::invalid_parameter(
            "station_id",
            format!("'{}' contains invalid characters", id),
        ));
    }
    Ok(id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_location() {
        let loc = parse_location("41.4302", " -71.455").unwrap();
        assert_eq!(loc.latitude, 41.4302);

        assert!(matches!(
            parse_location("91", "0"),
            Err(MarineError::InvalidCoordinates { .. })
        ));
        assert!(matches!(
            parse_location("abc", "0"),
            Err(MarineError::InvalidParameter { .. })
        ));
        assert!(matches!(
            parse_location("NaN", "0"),
            Err(MarineError::InvalidCoordinates { .. })
        ));
    }

    #[test]
    fn test_parse_count_bounds() {
        assert_eq!(parse_count(None, 5, NEARBY_COUNT_RANGE).unwrap(), 5);
        assert_eq!(parse_count(Some("10"), 5, NEARBY_COUNT_RANGE).unwrap(), 10);
        assert!(parse_count(Some("11"), 5, NEARBY_COUNT_RANGE).is_err());
        assert!(parse_count(Some("0"), 5, NEARBY_COUNT_RANGE).is_err());
        assert!(parse_count(Some("-1"), 5, NEARBY_COUNT_RANGE).is_err());
        assert!(parse_count(Some("2.5"), 5, NEARBY_COUNT_RANGE).is_err());
    }

    #[test]
    fn test_parse_days() {
        assert_eq!(parse_days(None).unwrap(), 3);
        assert_eq!(parse_days(Some("")).unwrap(), 3);
        assert_eq!(parse_days(Some("10")).unwrap(), 10);
        let err = parse_days(Some("11")).unwrap_err();
        assert_eq!(
            err,
            MarineError::invalid_parameter("days", "must be between 1 and 10")
        );
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("active", None, true).unwrap());
        assert!(!parse_flag("active", Some("False"), true).unwrap());
        assert!(parse_flag("active", Some("1"), false).unwrap());
        assert!(parse_flag("active", Some("maybe"), true).is_err());
    }

    #[test]
    fn test_parse_datum() {
        assert_eq!(parse_datum(None).unwrap(), None);
        assert_eq!(parse_datum(Some("MSL")).unwrap(), Some(Datum::MeanSeaLevel));
        assert!(parse_datum(Some("navd88")).is_err());
    }

    #[test]
    fn test_parse_station_id() {
        assert_eq!(parse_station_id(" 44097 ").unwrap(), "44097");
        assert!(parse_station_id("").is_err());
        assert!(parse_station_id("44097;drop").is_err());
    }

    #[test]
    fn test_require() {
        assert_eq!(require("lat", Some(" 41.5 ")).unwrap(), "41.5");
        assert_eq!(
            require("lat", None).unwrap_err(),
            MarineError::MissingParameter("lat".into())
        );
        assert!(require("lat", Some("  ")).is_err());
    }
}
