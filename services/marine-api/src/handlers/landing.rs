//! Service landing page.

use axum::Json;
use serde::Serialize;

use crate::router::ROUTES;

#[derive(Debug, Serialize)]
pub struct AvailableEndpoints {
    pub buoys: &'static str,
    pub forecast: &'static str,
    pub tides: &'static str,
}

#[derive(Debug, Serialize)]
pub struct LandingResponse {
    pub message: &'static str,
    pub registered_routes: Vec<&'static str>,
    pub available_endpoints: AvailableEndpoints,
}

/// GET /
pub async fn landing_handler() -> Json<LandingResponse> {
    Json(LandingResponse {
        message: "Welcome to the marine data API",
        registered_routes: ROUTES.iter().map(|(_, path)| *path).collect(),
        available_endpoints: AvailableEndpoints {
            buoys: "/api/buoys/nearby/{lat}/{lon}",
            forecast: "/api/forecast/{lat}/{lon}",
            tides: "/api/tides/location?lat={lat}&lon={lon}",
        },
    })
}
