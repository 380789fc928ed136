//! National Weather Service API response types.
//!
//! Every field is optional: the NWS GeoJSON payloads vary by product and
//! region, and a missing field must be a handled branch rather than a crash.

use serde::Deserialize;
use serde_json::Number;

/// Response from `/alerts/active/area/{state}` and `/alerts/active?point=`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlertsResponse {
    pub features: Option<Vec<AlertFeature>>,
}

/// One active alert.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlertFeature {
    pub properties: Option<AlertProperties>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertProperties {
    pub event: Option<String>,
    pub area_desc: Option<String>,
    pub severity: Option<String>,
    pub description: Option<String>,
    pub instruction: Option<String>,
}

/// Response from `/points/{lat},{lon}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PointsResponse {
    pub properties: Option<PointsProperties>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PointsProperties {
    /// Absolute URL of the gridpoint forecast endpoint.
    pub forecast: Option<String>,
}

impl PointsResponse {
    pub fn forecast_url(&self) -> Option<&str> {
        self.properties.as_ref()?.forecast.as_deref()
    }
}

/// Response from a gridpoint forecast URL.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForecastResponse {
    pub properties: Option<ForecastProperties>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForecastProperties {
    pub periods: Option<Vec<ForecastPeriod>>,
}

impl ForecastResponse {
    pub fn periods(&self) -> Option<&[ForecastPeriod]> {
        self.properties.as_ref()?.periods.as_deref()
    }
}

/// One forecast time window ("Tonight", "Monday", ...).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPeriod {
    pub name: Option<String>,
    /// Kept as a JSON number so integral values render without a fraction.
    pub temperature: Option<Number>,
    pub temperature_unit: Option<String>,
    pub wind_speed: Option<String>,
    pub wind_direction: Option<String>,
    pub detailed_forecast: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn alert_properties_use_camel_case() {
        let feature: AlertFeature = serde_json::from_value(json!({
            "properties": {
                "event": "Flood Warning",
                "areaDesc": "Harris, TX",
                "severity": "Severe"
            }
        }))
        .unwrap();

        let props = feature.properties.unwrap();
        assert_eq!(props.event.as_deref(), Some("Flood Warning"));
        assert_eq!(props.area_desc.as_deref(), Some("Harris, TX"));
        assert!(props.description.is_none());
    }

    #[test]
    fn alerts_response_without_features() {
        let resp: AlertsResponse = serde_json::from_value(json!({"title": "none"})).unwrap();
        assert!(resp.features.is_none());
    }

    #[test]
    fn points_forecast_url_missing_properties() {
        let resp: PointsResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(resp.forecast_url(), None);

        let resp: PointsResponse =
            serde_json::from_value(json!({"properties": {"forecastHourly": "x"}})).unwrap();
        assert_eq!(resp.forecast_url(), None);
    }

    #[test]
    fn points_forecast_url_present() {
        let resp: PointsResponse = serde_json::from_value(json!({
            "properties": {"forecast": "https://api.weather.gov/gridpoints/OKX/33,35/forecast"}
        }))
        .unwrap();
        assert_eq!(
            resp.forecast_url(),
            Some("https://api.weather.gov/gridpoints/OKX/33,35/forecast")
        );
    }

    #[test]
    fn forecast_period_deserializes() {
        let period: ForecastPeriod = serde_json::from_value(json!({
            "number": 1,
            "name": "Tonight",
            "temperature": 58,
            "temperatureUnit": "F",
            "windSpeed": "5 mph",
            "windDirection": "SW",
            "detailedForecast": "Clear."
        }))
        .unwrap();

        assert_eq!(period.name.as_deref(), Some("Tonight"));
        assert_eq!(period.temperature.unwrap().to_string(), "58");
        assert_eq!(period.wind_direction.as_deref(), Some("SW"));
    }
}
