//! Tool definitions and implementations for the MCP server.
//!
//! Each tool module exposes a `definitions()` function with the tool schemas
//! and one async function per tool taking the shared [`ToolState`] and the
//! raw call arguments. [`ToolRegistry::execute`] maps names to functions and
//! does nothing else.
//!
//! Upstream failures are reported as ordinary text results so the calling
//! model can read them. Only malformed calls (missing or mistyped arguments,
//! unknown tool names) come back with `isError: true`.

mod math;
mod search;
mod weather;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::config::ServerConfig;
use crate::nws::{NwsClient, NwsError};
use crate::protocol::{CallToolResult, ToolDefinition};
use crate::search::{BraveClient, SearchError, SearchProvider};

pub use math::sum_text;
pub use search::{MISSING_API_KEY_MESSAGE, clamp_count, search_text};
pub use weather::{
    ALERTS_UNAVAILABLE, FORECAST_UNAVAILABLE, MAX_PERIODS, NO_ACTIVE_ALERTS,
    NO_ACTIVE_ALERTS_AT_POINT, NO_FORECAST_PERIODS, POINTS_UNAVAILABLE, alerts_for_point_text,
    alerts_text, format_alert, format_period, forecast_text, render_periods,
};

/// Errors that can occur while building the tool registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to build NWS client: {0}")]
    Nws(#[from] NwsError),

    #[error("failed to build search client: {0}")]
    Search(#[from] SearchError),
}

/// Shared state for tools.
pub struct ToolState {
    pub nws: NwsClient,
    /// Search provider, absent when no API key is configured.
    pub search: Option<Arc<dyn SearchProvider>>,
}

/// Registry of available tools.
#[derive(Clone)]
pub struct ToolRegistry {
    state: Arc<ToolState>,
}

impl ToolRegistry {
    pub fn new(nws: NwsClient, search: Option<Arc<dyn SearchProvider>>) -> Self {
        Self {
            state: Arc::new(ToolState { nws, search }),
        }
    }

    /// Build the registry and its upstream clients from configuration.
    pub fn from_config(config: &ServerConfig) -> Result<Self, RegistryError> {
        let nws = NwsClient::new(config)?;
        let search = BraveClient::from_config(config)?
            .map(|client| Arc::new(client) as Arc<dyn SearchProvider>);
        Ok(Self::new(nws, search))
    }

    pub fn state(&self) -> &ToolState {
        &self.state
    }

    /// Get all tool definitions (for MCP protocol).
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut tools = Vec::new();
        tools.extend(weather::definitions());
        tools.extend(math::definitions());
        tools.extend(search::definitions());
        tools
    }

    /// Execute a tool by name.
    pub async fn execute(&self, name: &str, arguments: &HashMap<String, Value>) -> CallToolResult {
        let start = Instant::now();
        let state = &self.state;

        let result = match name {
            "get_alerts" => weather::get_alerts(state, arguments).await,
            "get_forecast" => weather::get_forecast(state, arguments).await,
            "add_numbers" => math::add_numbers(state, arguments).await,
            "brave_search" => search::brave_search(state, arguments).await,
            _ => CallToolResult::error(format!("Unknown tool: {}", name)),
        };

        debug!(
            tool = %name,
            duration_ms = start.elapsed().as_millis() as u64,
            is_error = result.is_error.unwrap_or(false),
            "tool finished"
        );

        result
    }
}

/// Extract a required string argument.
fn required_str<'a>(
    arguments: &'a HashMap<String, Value>,
    name: &str,
) -> Result<&'a str, CallToolResult> {
    match arguments.get(name) {
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(_) => Err(CallToolResult::error(format!(
            "Invalid parameter: {} must be a string",
            name
        ))),
        None => Err(CallToolResult::error(format!(
            "Missing required parameter: {}",
            name
        ))),
    }
}

/// Extract a required numeric argument. Numeric strings are accepted.
fn required_f64(arguments: &HashMap<String, Value>, name: &str) -> Result<f64, CallToolResult> {
    let value = arguments.get(name).ok_or_else(|| {
        CallToolResult::error(format!("Missing required parameter: {}", name))
    })?;

    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    number.filter(|n| n.is_finite()).ok_or_else(|| {
        CallToolResult::error(format!("Invalid parameter: {} must be a number", name))
    })
}

/// Extract an optional integer argument, falling back to `default`.
fn optional_i64(
    arguments: &HashMap<String, Value>,
    name: &str,
    default: i64,
) -> Result<i64, CallToolResult> {
    match arguments.get(name) {
        None | Some(Value::Null) => Ok(default),
        Some(value) => value.as_i64().ok_or_else(|| {
            CallToolResult::error(format!("Invalid parameter: {} must be an integer", name))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> HashMap<String, Value> {
        serde_json::from_value(value).unwrap()
    }

    fn test_registry() -> ToolRegistry {
        let config = ServerConfig::default().with_nws_base_url("http://127.0.0.1:1");
        ToolRegistry::from_config(&config).unwrap()
    }

    #[test]
    fn test_definitions() {
        let registry = test_registry();
        let defs = registry.definitions();

        let names: Vec<_> = defs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["get_alerts", "get_forecast", "add_numbers", "brave_search"]
        );

        for def in defs {
            assert!(!def.description.is_empty());
            assert_eq!(def.input_schema["type"], "object");
            for property in def.input_schema["properties"].as_object().unwrap().values() {
                assert!(property["description"].is_string());
            }
        }
    }

    #[test]
    fn test_tool_names_unique() {
        let defs = test_registry().definitions();
        let mut names: Vec<_> = defs.iter().map(|d| d.name.clone()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), defs.len());
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let result = test_registry().execute("get_weather", &HashMap::new()).await;
        assert_eq!(result.is_error, Some(true));
        assert_eq!(result.text(), "Unknown tool: get_weather");
    }

    #[test]
    fn test_required_str() {
        let arguments = args(json!({"state": "CA", "count": 3}));
        assert_eq!(required_str(&arguments, "state").unwrap(), "CA");

        let err = required_str(&arguments, "query").unwrap_err();
        assert_eq!(err.text(), "Missing required parameter: query");

        let err = required_str(&arguments, "count").unwrap_err();
        assert_eq!(err.text(), "Invalid parameter: count must be a string");
    }

    #[test]
    fn test_required_f64() {
        let arguments = args(json!({"a": 2, "b": "3.5", "c": true, "d": "abc"}));
        assert_eq!(required_f64(&arguments, "a").unwrap(), 2.0);
        assert_eq!(required_f64(&arguments, "b").unwrap(), 3.5);
        assert!(required_f64(&arguments, "c").is_err());
        assert!(required_f64(&arguments, "d").is_err());
        assert_eq!(
            required_f64(&arguments, "e").unwrap_err().text(),
            "Missing required parameter: e"
        );
    }

    #[test]
    fn test_optional_i64() {
        let arguments = args(json!({"count": 7, "bad": "x", "null": null}));
        assert_eq!(optional_i64(&arguments, "count", 3).unwrap(), 7);
        assert_eq!(optional_i64(&arguments, "missing", 3).unwrap(), 3);
        assert_eq!(optional_i64(&arguments, "null", 3).unwrap(), 3);
        assert!(optional_i64(&arguments, "bad", 3).is_err());
    }
}
