//! Normalized JSON response envelopes.
//!
//! Whatever shape a collaborator answers with, handlers only ever serialize
//! one of these.

use chrono::{DateTime, Utc};
use marine_common::{
    BuoyReading, Datum, Location, NearbyStation, StationInfo, Swell, TidalEvent, TideBundle,
    TimeRange,
};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LocationBody {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<&Location> for LocationBody {
    fn from(location: &Location) -> Self {
        Self {
            latitude: location.latitude,
            longitude: location.longitude,
        }
    }
}

// ============================================================================
// Buoys
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct NearbyRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub count: usize,
    pub active: bool,
    #[serde(rename = "type")]
    pub buoy_type: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NearbyBuoy {
    pub id: String,
    pub name: String,
    pub location: LocationBody,
    pub distance_km: f64,
    pub active: bool,
    #[serde(rename = "type")]
    pub buoy_type: Option<String>,
    pub owner: Option<String>,
    pub program: Option<String>,
}

impl From<&NearbyStation> for NearbyBuoy {
    fn from(nearby: &NearbyStation) -> Self {
        let info = nearby.station.info();
        Self {
            id: info.station_id.clone(),
            name: info.name.clone(),
            location: LocationBody::from(&info.location),
            distance_km: nearby.distance_km,
            active: info.active,
            buoy_type: info.buoy_type.clone(),
            owner: info.owner.clone(),
            program: info.program.clone(),
        }
    }
}

/// `GET /api/buoys/nearby/{lat}/{lon}`
#[derive(Debug, Clone, Serialize)]
pub struct NearbyEnvelope {
    pub request: NearbyRequest,
    pub stations: Vec<NearbyBuoy>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WaveSummaryBody {
    pub height: Option<f64>,
    pub period: Option<f64>,
    pub direction: Option<f64>,
    pub compass_direction: Option<&'static str>,
}

impl From<Option<&Swell>> for WaveSummaryBody {
    fn from(swell: Option<&Swell>) -> Self {
        match swell {
            Some(swell) => Self {
                height: Some(swell.wave_height),
                period: Some(swell.period),
                direction: swell.direction,
                compass_direction: swell.compass_direction(),
            },
            None => Self::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwellBody {
    pub height: f64,
    pub period: f64,
    pub direction: Option<f64>,
    pub compass_direction: Option<&'static str>,
}

impl From<&Swell> for SwellBody {
    fn from(swell: &Swell) -> Self {
        Self {
            height: swell.wave_height,
            period: swell.period,
            direction: swell.direction,
            compass_direction: swell.compass_direction(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindBody {
    pub speed: Option<f64>,
    pub direction: Option<f64>,
    pub compass_direction: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gust: Option<f64>,
}

impl From<&BuoyReading> for WindBody {
    fn from(reading: &BuoyReading) -> Self {
        Self {
            speed: reading.wind_speed,
            direction: reading.wind_direction,
            compass_direction: reading.wind_compass_direction(),
            gust: reading.wind_gust,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherBody {
    pub air_temperature: Option<f64>,
    pub water_temperature: Option<f64>,
    pub pressure: Option<f64>,
    pub dewpoint: Option<f64>,
    pub visibility: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadingBody {
    pub timestamp: DateTime<Utc>,
    pub wave_summary: WaveSummaryBody,
    pub wind: WindBody,
    pub weather: WeatherBody,
    pub swells: Vec<SwellBody>,
}

impl From<&BuoyReading> for ReadingBody {
    fn from(reading: &BuoyReading) -> Self {
        Self {
            timestamp: reading.date,
            wave_summary: WaveSummaryBody::from(reading.wave_summary.as_ref()),
            wind: WindBody::from(reading),
            weather: WeatherBody {
                air_temperature: reading.air_temperature,
                water_temperature: reading.water_temperature,
                pressure: reading.pressure,
                dewpoint: reading.dewpoint,
                visibility: reading.visibility,
            },
            swells: reading.swell_components.iter().map(SwellBody::from).collect(),
        }
    }
}

/// `GET /api/buoys/{station_id}/data`
#[derive(Debug, Clone, Serialize)]
pub struct BuoyReadingsEnvelope {
    pub station_id: String,
    pub readings: Vec<ReadingBody>,
}

/// `GET /api/buoys/{station_id}/current`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentConditions {
    pub wave_height: Option<f64>,
    pub wave_period: Option<f64>,
    pub wave_direction: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<f64>,
}

impl From<&BuoyReading> for CurrentConditions {
    fn from(reading: &BuoyReading) -> Self {
        let wave = reading.wave_summary.as_ref();
        Self {
            wave_height: wave.map(|w| w.wave_height),
            wave_period: wave.map(|w| w.period),
            wave_direction: wave.and_then(|w| w.direction),
            wind_speed: reading.wind_speed,
            wind_direction: reading.wind_direction,
        }
    }
}

// ============================================================================
// Forecasts
// ============================================================================

/// One forecast step. Model forecasts carry wind; buoy forecasts do not.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastStep {
    pub timestamp: DateTime<Utc>,
    pub wave_summary: WaveSummaryBody,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind: Option<WindBody>,
    pub swells: Vec<SwellBody>,
}

impl ForecastStep {
    pub fn with_wind(reading: &BuoyReading) -> Self {
        Self {
            wind: Some(WindBody {
                gust: None,
                ..WindBody::from(reading)
            }),
            ..Self::waves_only(reading)
        }
    }

    pub fn waves_only(reading: &BuoyReading) -> Self {
        Self {
            timestamp: reading.date,
            wave_summary: WaveSummaryBody::from(reading.wave_summary.as_ref()),
            wind: None,
            swells: reading.swell_components.iter().map(SwellBody::from).collect(),
        }
    }
}

// ============================================================================
// Tides
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct TideStationBody {
    pub id: String,
    pub name: String,
    pub location: LocationBody,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

impl TideStationBody {
    pub fn new(info: &StationInfo, distance_km: Option<f64>) -> Self {
        Self {
            id: info.station_id.clone(),
            name: info.name.clone(),
            location: LocationBody::from(&info.location),
            distance_km,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TideRequestBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    pub days: u32,
    /// The datum that actually produced the data.
    pub datum: Datum,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl TideRequestBody {
    pub fn new(location: Option<&Location>, days: u32, datum: Datum, range: &TimeRange) -> Self {
        Self {
            latitude: location.map(|l| l.latitude),
            longitude: location.map(|l| l.longitude),
            days,
            datum,
            start_time: range.start,
            end_time: range.end,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TideEventBody {
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub event_type: TidalEvent,
    pub height: f64,
    pub datum: Datum,
}

#[derive(Debug, Clone, Serialize)]
pub struct TidePredictionBody {
    pub timestamp: DateTime<Utc>,
    pub height: f64,
    pub datum: Datum,
}

/// `GET /api/tides/location` and `GET /api/tides/station/{station_id}`
#[derive(Debug, Clone, Serialize)]
pub struct TideEnvelope {
    pub station: TideStationBody,
    pub request: TideRequestBody,
    pub tides: Vec<TideEventBody>,
    pub predictions: Vec<TidePredictionBody>,
}

impl TideEnvelope {
    pub fn new(station: TideStationBody, request: TideRequestBody, bundle: TideBundle) -> Self {
        let tides = bundle
            .events
            .into_iter()
            .map(|event| TideEventBody {
                timestamp: event.date,
                event_type: event.tidal_event,
                height: event.water_level,
                datum: event.datum,
            })
            .collect();

        let predictions = bundle
            .predictions
            .into_iter()
            .map(|prediction| TidePredictionBody {
                timestamp: prediction.date,
                height: prediction.water_level,
                datum: prediction.datum,
            })
            .collect();

        Self {
            station,
            request,
            tides,
            predictions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn reading() -> BuoyReading {
        let mut reading = BuoyReading::at(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap());
        reading.wave_summary = Some(Swell {
            wave_height: 1.5,
            period: 9.0,
            direction: Some(90.0),
        });
        reading.wind_speed = Some(6.0);
        reading.wind_direction = Some(225.0);
        reading.wind_gust = Some(9.0);
        reading
    }

    #[test]
    fn test_reading_body_shape() {
        let json = serde_json::to_value(ReadingBody::from(&reading())).unwrap();

        assert_eq!(json["timestamp"], "2024-06-01T12:00:00Z");
        assert_eq!(json["wave_summary"]["height"], 1.5);
        assert_eq!(json["wave_summary"]["compass_direction"], "E");
        assert_eq!(json["wind"]["compass_direction"], "SW");
        assert_eq!(json["wind"]["gust"], 9.0);
        assert!(json["weather"]["pressure"].is_null());
        assert_eq!(json["swells"], serde_json::json!([]));
    }

    #[test]
    fn test_missing_wave_summary_serializes_nulls() {
        let json = serde_json::to_value(WaveSummaryBody::from(None)).unwrap();
        assert!(json["height"].is_null());
        assert!(json["compass_direction"].is_null());
    }

    #[test]
    fn test_forecast_step_wind_is_optional() {
        let with_wind = serde_json::to_value(ForecastStep::with_wind(&reading())).unwrap();
        let waves_only = serde_json::to_value(ForecastStep::waves_only(&reading())).unwrap();

        assert_eq!(with_wind["wind"]["speed"], 6.0);
        assert!(with_wind["wind"].get("gust").is_none());
        assert!(waves_only.get("wind").is_none());
    }

    #[test]
    fn test_current_conditions() {
        let current = CurrentConditions::from(&reading());
        assert_eq!(current.wave_height, Some(1.5));
        assert_eq!(current.wave_direction, Some(90.0));

        let bare = CurrentConditions::from(&BuoyReading::at(Utc::now()));
        assert_eq!(bare.wave_height, None);
    }
}
