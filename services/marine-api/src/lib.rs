//! Marine data API service library.
//!
//! Buoy observations, model wave forecasts and tide predictions behind a
//! JSON HTTP API. Modules are public so the router can be driven from
//! integration tests.

pub mod config;
pub mod envelope;
pub mod gateway;
pub mod handlers;
pub mod router;
pub mod snapshot;
pub mod state;
