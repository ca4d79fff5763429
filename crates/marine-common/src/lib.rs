//! Common types and utilities shared across the marine data services.

pub mod error;
pub mod fetch;
pub mod location;
pub mod provider;
pub mod reading;
pub mod station;
pub mod tide;
pub mod time;

pub use error::{ErrorBody, ErrorClass, MarineError, MarineResult, ValidRange};
pub use fetch::FetchResult;
pub use location::{compass_direction, Location};
pub use provider::{ModelProvider, ModelRecord, NearbyStation, ParsedModelData, Station, StationDirectory};
pub use reading::{BuoyReading, Swell};
pub use station::{StationFilter, StationInfo};
pub use tide::{Datum, TidalEvent, TideBundle, TideEvent, TideInterval, TidePrediction};
pub use time::TimeRange;
