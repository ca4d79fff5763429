//! Static endpoint documentation.

use axum::Json;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ParamDoc {
    pub name: &'static str,
    pub description: &'static str,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EndpointDoc {
    pub method: &'static str,
    pub path: &'static str,
    pub description: &'static str,
    pub parameters: Vec<ParamDoc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocsResponse {
    pub service: &'static str,
    pub endpoints: Vec<EndpointDoc>,
}

const fn required(name: &'static str, description: &'static str) -> ParamDoc {
    ParamDoc {
        name,
        description,
        required: true,
        default: None,
    }
}

const fn optional(
    name: &'static str,
    description: &'static str,
    default: Option<&'static str>,
) -> ParamDoc {
    ParamDoc {
        name,
        description,
        required: false,
        default,
    }
}

/// GET /api/buoys/docs
pub async fn buoy_docs_handler() -> Json<DocsResponse> {
    Json(DocsResponse {
        service: "buoys",
        endpoints: vec![
            EndpointDoc {
                method: "GET",
                path: "/api/buoys/nearby/{lat}/{lon}",
                description: "Closest buoys to a location, nearest first",
                parameters: vec![
                    required("lat", "Latitude in degrees, -90 to 90"),
                    required("lon", "Longitude in degrees, -180 to 180"),
                    optional("count", "Number of buoys, 1 to 10", Some("5")),
                    optional("active", "Only include reporting buoys", Some("true")),
                    optional("type", "Platform type, e.g. buoy or fixed", None),
                ],
            },
            EndpointDoc {
                method: "GET",
                path: "/api/buoys/{station_id}/data",
                description: "Recent detailed readings for a buoy",
                parameters: vec![
                    required("station_id", "Buoy station identifier"),
                    optional("count", "Number of readings, 1 to 50", Some("20")),
                ],
            },
            EndpointDoc {
                method: "GET",
                path: "/api/buoys/{station_id}/current",
                description: "Latest wave and wind conditions for a buoy",
                parameters: vec![required("station_id", "Buoy station identifier")],
            },
            EndpointDoc {
                method: "GET",
                path: "/api/forecast/{lat}/{lon}",
                description: "Model wave forecast for a location",
                parameters: vec![
                    required("lat", "Latitude in degrees, -90 to 90"),
                    required("lon", "Longitude in degrees, -180 to 180"),
                    optional("days", "Forecast length in days, 1 to 10", Some("3")),
                ],
            },
            EndpointDoc {
                method: "GET",
                path: "/api/forecast/buoy/{station_id}",
                description: "The 20 most recent readings of a buoy as forecast steps",
                parameters: vec![required("station_id", "Buoy station identifier")],
            },
        ],
    })
}

/// GET /api/tides/docs
pub async fn tide_docs_handler() -> Json<DocsResponse> {
    let window = [
        optional("days", "Window length in days, 1 to 10", Some("3")),
        optional(
            "datum",
            "Pin one datum by name or code (e.g. mean_sea_level, MSL); otherwise the configured fallback order is used",
            None,
        ),
    ];

    Json(DocsResponse {
        service: "tides",
        endpoints: vec![
            EndpointDoc {
                method: "GET",
                path: "/api/tides/location",
                description: "Tides at the station closest to a location",
                parameters: [
                    required("lat", "Latitude in degrees, -90 to 90"),
                    required("lon", "Longitude in degrees, -180 to 180"),
                ]
                .into_iter()
                .chain(window.clone())
                .collect(),
            },
            EndpointDoc {
                method: "GET",
                path: "/api/tides/station/{station_id}",
                description: "Tides at a named station",
                parameters: [required("station_id", "Tide station identifier")]
                    .into_iter()
                    .chain(window)
                    .collect(),
            },
        ],
    })
}
