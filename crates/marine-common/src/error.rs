//! Error types for the marine data services.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::location::{LATITUDE_RANGE, LONGITUDE_RANGE};

/// Result type alias using MarineError.
pub type MarineResult<T> = Result<T, MarineError>;

/// Primary error type for marine data lookups.
///
/// Errors are `Clone` because a single upstream failure may be handed to every
/// caller waiting on the same in-flight cache computation.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MarineError {
    // === Validation Errors ===
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    #[error("Coordinates out of range: latitude={latitude}, longitude={longitude}")]
    InvalidCoordinates { latitude: f64, longitude: f64 },

    // === Lookup Errors ===
    #[error("Station not found: {0}")]
    StationNotFound(String),

    #[error("No station found near ({latitude}, {longitude})")]
    NoStationNearby { latitude: f64, longitude: f64 },

    #[error("No data available for station {0}")]
    NoDataAvailable(String),

    // === Upstream Errors ===
    #[error("Upstream failure: {0}")]
    UpstreamFailure(String),

    #[error("No tide data returned by station {0} for any datum")]
    TideDataUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse error classes reported to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Validation,
    NotFound,
    Upstream,
    Unhandled,
}

impl MarineError {
    pub fn invalid_parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        MarineError::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            MarineError::MissingParameter(_)
            | MarineError::InvalidParameter { .. }
            | MarineError::InvalidCoordinates { .. } => ErrorClass::Validation,

            MarineError::StationNotFound(_)
            | MarineError::NoStationNearby { .. }
            | MarineError::NoDataAvailable(_) => ErrorClass::NotFound,

            MarineError::UpstreamFailure(_) | MarineError::TideDataUnavailable(_) => {
                ErrorClass::Upstream
            }
            MarineError::Internal(_) => ErrorClass::Unhandled,
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self.class() {
            ErrorClass::Validation => 400,
            ErrorClass::NotFound => 404,
            ErrorClass::Upstream | ErrorClass::Unhandled => 500,
        }
    }

    /// Short, stable title used as the `error` field of a response body.
    pub fn title(&self) -> &'static str {
        match self {
            MarineError::MissingParameter(_) => "Missing required parameter",
            MarineError::InvalidParameter { .. } => "Invalid parameters",
            MarineError::InvalidCoordinates { .. } => "Invalid coordinates",
            MarineError::StationNotFound(_) => "Station not found",
            MarineError::NoStationNearby { .. } => "No station found near location",
            MarineError::NoDataAvailable(_) => "No data available",
            MarineError::UpstreamFailure(_) => "Upstream failure",
            MarineError::TideDataUnavailable(_) => "Failed to fetch tide data",
            MarineError::Internal(_) => "Server error",
        }
    }

    /// Convert to the JSON error body returned to clients.
    pub fn to_body(&self) -> ErrorBody {
        let mut body = ErrorBody::new(self.title()).with_details(self.to_string());

        match self {
            MarineError::InvalidCoordinates {
                latitude,
                longitude,
            } => {
                body.location = Some(serde_json::json!({
                    "latitude": latitude,
                    "longitude": longitude,
                }));
                body.valid_range = Some(ValidRange::default());
            }
            MarineError::NoStationNearby {
                latitude,
                longitude,
            } => {
                body.location = Some(serde_json::json!({
                    "latitude": latitude,
                    "longitude": longitude,
                }));
            }
            MarineError::StationNotFound(id)
            | MarineError::NoDataAvailable(id)
            | MarineError::TideDataUnavailable(id) => {
                body.station_id = Some(id.clone());
            }
            _ => {}
        }

        body
    }
}

impl From<serde_json::Error> for MarineError {
    fn from(err: serde_json::Error) -> Self {
        MarineError::Internal(err.to_string())
    }
}

impl From<std::io::Error> for MarineError {
    fn from(err: std::io::Error) -> Self {
        MarineError::Internal(err.to_string())
    }
}

/// JSON error body: always carries `error`, the rest only where useful.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub error: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub station_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_range: Option<ValidRange>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
            station_id: None,
            location: None,
            valid_range: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Documented valid coordinate ranges, echoed back on coordinate errors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidRange {
    pub latitude: [f64; 2],
    pub longitude: [f64; 2],
}

impl Default for ValidRange {
    fn default() -> Self {
        Self {
            latitude: [*LATITUDE_RANGE.start(), *LATITUDE_RANGE.end()],
            longitude: [*LONGITUDE_RANGE.start(), *LONGITUDE_RANGE.end()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(MarineError::MissingParameter("lat".into()).http_status_code(), 400);
        assert_eq!(
            MarineError::invalid_parameter("count", "must be 1-10").http_status_code(),
            400
        );
        assert_eq!(MarineError::StationNotFound("44013".into()).http_status_code(), 404);
        assert_eq!(MarineError::NoDataAvailable("44013".into()).http_status_code(), 404);
        assert_eq!(MarineError::UpstreamFailure("boom".into()).http_status_code(), 500);
        assert_eq!(MarineError::TideDataUnavailable("8452660".into()).http_status_code(), 500);
        assert_eq!(MarineError::Internal("boom".into()).http_status_code(), 500);
    }

    #[test]
    fn test_coordinate_error_body_has_valid_range() {
        let body = MarineError::InvalidCoordinates {
            latitude: 91.0,
            longitude: 0.0,
        }
        .to_body();

        assert_eq!(body.error, "Invalid coordinates");
        let range = body.valid_range.expect("valid range present");
        assert_eq!(range.latitude, [-90.0, 90.0]);
        assert_eq!(range.longitude, [-180.0, 180.0]);
    }

    #[test]
    fn test_station_not_found_body() {
        let body = MarineError::StationNotFound("8454000".into()).to_body();
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["error"], "Station not found");
        assert_eq!(json["station_id"], "8454000");
        assert!(json.get("valid_range").is_none());
    }
}
