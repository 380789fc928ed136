//! Weather tools backed by the National Weather Service.

use std::collections::HashMap;

use serde_json::{Value, json};
use tracing::warn;

use crate::nws::{
    AlertFeature, AlertProperties, AlertsResponse, ForecastPeriod, NwsClient, NwsError,
};
use crate::protocol::{CallToolResult, ToolDefinition};

use super::{ToolState, required_f64, required_str};

pub const ALERTS_UNAVAILABLE: &str = "Unable to fetch alerts or no alerts found.";
pub const NO_ACTIVE_ALERTS: &str = "No active alerts for this state.";
pub const NO_ACTIVE_ALERTS_AT_POINT: &str = "No active alerts for this location.";
pub const POINTS_UNAVAILABLE: &str = "Unable to fetch forecast data for this location.";
pub const FORECAST_UNAVAILABLE: &str = "Unable to fetch detailed forecast.";
pub const NO_FORECAST_PERIODS: &str = "No forecast periods available.";

/// Separator placed between rendered alerts and forecast periods.
const BLOCK_SEPARATOR: &str = "\n---\n";

/// Only the next few periods are rendered.
pub const MAX_PERIODS: usize = 5;

const UNKNOWN: &str = "Unknown";

pub fn definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "get_alerts".to_string(),
            description: "Get weather alerts for a US state.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "state": {
                        "type": "string",
                        "description": "Two-letter US state code (e.g. CA, NY)"
                    }
                },
                "required": ["state"]
            }),
        },
        ToolDefinition {
            name: "get_forecast".to_string(),
            description: "Get weather forecast for a location.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "latitude": {
                        "type": "number",
                        "description": "Latitude of the location"
                    },
                    "longitude": {
                        "type": "number",
                        "description": "Longitude of the location"
                    }
                },
                "required": ["latitude", "longitude"]
            }),
        },
    ]
}

/// Render one alert as a labelled block, substituting fallbacks for
/// missing fields.
pub fn format_alert(feature: &AlertFeature) -> String {
    let empty = AlertProperties::default();
    let props = feature.properties.as_ref().unwrap_or(&empty);

    format!(
        "\nEvent: {}\nArea: {}\nSeverity: {}\nDescription: {}\nInstructions: {}\n",
        props.event.as_deref().unwrap_or(UNKNOWN),
        props.area_desc.as_deref().unwrap_or(UNKNOWN),
        props.severity.as_deref().unwrap_or(UNKNOWN),
        props
            .description
            .as_deref()
            .unwrap_or("No description available"),
        props
            .instruction
            .as_deref()
            .unwrap_or("No specific instructions provided"),
    )
}

/// Render one forecast period as a labelled block.
pub fn format_period(period: &ForecastPeriod) -> String {
    let temperature = period
        .temperature
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| UNKNOWN.to_string());

    format!(
        "\n{}:\nTemperature: {}°{}\nWind: {} {}\nForecast: {}\n",
        period.name.as_deref().unwrap_or(UNKNOWN),
        temperature,
        period.temperature_unit.as_deref().unwrap_or(""),
        period.wind_speed.as_deref().unwrap_or(UNKNOWN),
        period.wind_direction.as_deref().unwrap_or(""),
        period.detailed_forecast.as_deref().unwrap_or(UNKNOWN),
    )
}

/// Render the first [`MAX_PERIODS`] periods in upstream order.
pub fn render_periods(periods: &[ForecastPeriod]) -> String {
    periods
        .iter()
        .take(MAX_PERIODS)
        .map(format_period)
        .collect::<Vec<_>>()
        .join(BLOCK_SEPARATOR)
}

fn render_alerts(response: Result<AlertsResponse, NwsError>, none_active: &str) -> String {
    let features = match response {
        Ok(AlertsResponse {
            features: Some(features),
        }) => features,
        Ok(_) => {
            warn!("alerts response has no features");
            return ALERTS_UNAVAILABLE.to_string();
        }
        Err(_) => return ALERTS_UNAVAILABLE.to_string(),
    };

    if features.is_empty() {
        return none_active.to_string();
    }

    features
        .iter()
        .map(format_alert)
        .collect::<Vec<_>>()
        .join(BLOCK_SEPARATOR)
}

/// Active alerts for a state, rendered for display.
pub async fn alerts_text(nws: &NwsClient, state: &str) -> String {
    render_alerts(nws.alerts_for_state(state).await, NO_ACTIVE_ALERTS)
}

/// Active alerts covering a point, rendered for display.
pub async fn alerts_for_point_text(nws: &NwsClient, latitude: f64, longitude: f64) -> String {
    render_alerts(
        nws.alerts_for_point(latitude, longitude).await,
        NO_ACTIVE_ALERTS_AT_POINT,
    )
}

/// Forecast for a point, rendered for display.
///
/// Resolves the point to its gridpoint forecast URL first, then fetches
/// that URL. The second request depends on the first.
pub async fn forecast_text(nws: &NwsClient, latitude: f64, longitude: f64) -> String {
    let forecast_url = nws.points(latitude, longitude).await.and_then(|points| {
        points
            .forecast_url()
            .map(str::to_owned)
            .ok_or(NwsError::MissingField("properties.forecast"))
    });

    let forecast_url = match forecast_url {
        Ok(url) => url,
        Err(e) => {
            warn!(latitude, longitude, error = %e, "could not resolve forecast URL");
            return POINTS_UNAVAILABLE.to_string();
        }
    };

    let forecast = match nws.forecast(&forecast_url).await {
        Ok(forecast) => forecast,
        Err(_) => return FORECAST_UNAVAILABLE.to_string(),
    };

    match forecast.periods() {
        Some([]) => NO_FORECAST_PERIODS.to_string(),
        Some(periods) => render_periods(periods),
        None => {
            warn!(url = %forecast_url, "forecast response has no periods");
            FORECAST_UNAVAILABLE.to_string()
        }
    }
}

/// Get weather alerts for a US state.
pub async fn get_alerts(state: &ToolState, arguments: &HashMap<String, Value>) -> CallToolResult {
    let area = match required_str(arguments, "state") {
        Ok(s) => s.trim(),
        Err(e) => return e,
    };

    CallToolResult::success(alerts_text(&state.nws, area).await)
}

/// Get the forecast for a latitude/longitude pair.
pub async fn get_forecast(
    state: &ToolState,
    arguments: &HashMap<String, Value>,
) -> CallToolResult {
    let latitude = match required_f64(arguments, "latitude") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let longitude = match required_f64(arguments, "longitude") {
        Ok(v) => v,
        Err(e) => return e,
    };

    CallToolResult::success(forecast_text(&state.nws, latitude, longitude).await)
}
