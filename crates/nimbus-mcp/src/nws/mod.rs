//! National Weather Service integration.
//!
//! Alerts and gridpoint forecasts from `api.weather.gov`.

mod client;
mod types;

pub use client::{NwsClient, NwsError};
pub use types::*;
