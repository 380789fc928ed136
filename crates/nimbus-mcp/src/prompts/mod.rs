//! Prompt templates exposed through `prompts/list` and `prompts/get`.

use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, warn};

use crate::nws::NwsClient;
use crate::protocol::{GetPromptResult, PromptArgument, PromptDefinition};
use crate::tools::{alerts_for_point_text, forecast_text};

const SUGGEST_EVENTS: &str = "suggest_events";
const SUGGEST_EVENTS_DESCRIPTION: &str = "Get comprehensive weather data for a location to enable intelligent event suggestions.";

/// Errors from prompt lookup and argument handling.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("unknown prompt: {0}")]
    UnknownPrompt(String),

    #[error("missing required argument: {0}")]
    MissingArgument(&'static str),

    #[error("invalid coordinates '{input}': {reason}")]
    InvalidCoordinates { input: String, reason: String },
}

/// Registry of available prompts.
#[derive(Debug, Clone)]
pub struct PromptRegistry {
    nws: NwsClient,
}

impl PromptRegistry {
    pub fn new(nws: NwsClient) -> Self {
        Self { nws }
    }

    pub fn definitions(&self) -> Vec<PromptDefinition> {
        vec![PromptDefinition {
            name: SUGGEST_EVENTS.to_string(),
            description: SUGGEST_EVENTS_DESCRIPTION.to_string(),
            arguments: vec![PromptArgument {
                name: "location".to_string(),
                description: "Location name or coordinates (latitude,longitude)".to_string(),
                required: true,
            }],
        }]
    }

    /// Render a prompt by name.
    pub async fn get(
        &self,
        name: &str,
        arguments: &HashMap<String, String>,
    ) -> Result<GetPromptResult, PromptError> {
        match name {
            SUGGEST_EVENTS => {
                let location = arguments
                    .get("location")
                    .ok_or(PromptError::MissingArgument("location"))?;
                let text = suggest_events(&self.nws, location).await;
                Ok(GetPromptResult::user_text(SUGGEST_EVENTS_DESCRIPTION, text))
            }
            _ => Err(PromptError::UnknownPrompt(name.to_string())),
        }
    }
}

/// Parse `"<lat>,<lon>"` into a coordinate pair.
pub fn parse_coordinates(location: &str) -> Result<(f64, f64), PromptError> {
    let invalid = |reason: String| PromptError::InvalidCoordinates {
        input: location.to_string(),
        reason,
    };

    let parts: Vec<&str> = location.split(',').collect();
    let [lat, lon] = parts.as_slice() else {
        return Err(invalid(format!(
            "expected 2 comma-separated values, got {}",
            parts.len()
        )));
    };

    let parse = |part: &str| {
        part.trim()
            .parse::<f64>()
            .map_err(|e| invalid(format!("'{}' is not a number: {}", part.trim(), e)))
    };

    Ok((parse(*lat)?, parse(*lon)?))
}

/// Context asking the caller for coordinates when only a place name was given.
pub fn coordinates_request(location: &str) -> String {
    format!(
        "
Location: {location}

Please provide the latitude and longitude coordinates for this location in the format: latitude,longitude

For example:
- New York City: 40.7128,-74.0060
- Los Angeles: 34.0522,-118.2437
- London: 51.5074,-0.1278

Once you provide coordinates, I'll fetch the weather data and suggest appropriate events.
"
    )
}

fn weather_context(location: &str, lat: f64, lon: f64, alerts: &str, forecast: &str) -> String {
    format!(
        "
Location: {location} ({lat}, {lon})
Current Alerts: {alerts}

Detailed Forecast:
{forecast}

Based on this weather data, suggest appropriate events and activities for the next few days.
"
    )
}

/// Assemble weather context for event suggestions.
///
/// Place names without a comma short-circuit to a request for coordinates.
/// With coordinates, active alerts and the forecast are fetched and embedded.
pub async fn suggest_events(nws: &NwsClient, location: &str) -> String {
    if !location.contains(',') {
        return coordinates_request(location);
    }

    let (lat, lon) = match parse_coordinates(location) {
        Ok(coords) => coords,
        Err(e) => {
            warn!(error = %e, "could not parse prompt coordinates");
            return format!("Error gathering weather data: {}", e);
        }
    };

    debug!(lat, lon, "gathering weather context");
    let (alerts, forecast) = tokio::join!(
        alerts_for_point_text(nws, lat, lon),
        forecast_text(nws, lat, lon)
    );

    weather_context(location, lat, lon, &alerts, &forecast)
}
