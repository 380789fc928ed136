//! Web search tool.

use std::collections::HashMap;

use serde_json::{Value, json};
use tracing::warn;

use crate::protocol::{CallToolResult, ToolDefinition};
use crate::search::SearchProvider;

use super::{ToolState, optional_i64, required_str};

pub const MISSING_API_KEY_MESSAGE: &str = "Error: BRAVE_SEARCH_API_KEY environment variable not set. Please set your Brave Search API key.";

const DEFAULT_COUNT: i64 = 3;
const MAX_COUNT: i64 = 20;

pub fn definitions() -> Vec<ToolDefinition> {
    vec![ToolDefinition {
        name: "brave_search".to_string(),
        description: "Search the web using Brave Search API.".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query to execute"
                },
                "count": {
                    "type": "integer",
                    "description": "Number of search results to return (default: 3, max: 20)",
                    "default": DEFAULT_COUNT,
                    "minimum": 1,
                    "maximum": MAX_COUNT
                }
            },
            "required": ["query"]
        }),
    }]
}

/// Clamp a requested result count to `1..=20`.
pub fn clamp_count(count: i64) -> u32 {
    count.clamp(1, MAX_COUNT) as u32
}

/// Run a search and render the outcome for display.
///
/// Never fails: a missing provider or a provider error becomes text.
pub async fn search_text(provider: Option<&dyn SearchProvider>, query: &str, count: i64) -> String {
    let Some(provider) = provider else {
        return MISSING_API_KEY_MESSAGE.to_string();
    };

    match provider.search(query, clamp_count(count)).await {
        Ok(results) => format!("Search results for '{}':\n\n{}", query, results),
        Err(e) => {
            warn!(query = %query, error = %e, "search failed");
            format!("Error performing search: {}", e)
        }
    }
}

/// Search the web.
pub async fn brave_search(state: &ToolState, arguments: &HashMap<String, Value>) -> CallToolResult {
    let query = match required_str(arguments, "query") {
        Ok(q) => q,
        Err(e) => return e,
    };
    let count = match optional_i64(arguments, "count", DEFAULT_COUNT) {
        Ok(c) => c,
        Err(e) => return e,
    };

    CallToolResult::success(search_text(state.search.as_deref(), query, count).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::nws::NwsClient;
    use crate::search::SearchError;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    /// Records every call and answers with a canned result.
    #[derive(Default)]
    struct RecordingProvider {
        calls: Mutex<Vec<(String, u32)>>,
        fail: bool,
    }

    #[async_trait]
    impl SearchProvider for RecordingProvider {
        async fn search(&self, query: &str, count: u32) -> Result<String, SearchError> {
            self.calls.lock().unwrap().push((query.to_string(), count));
            if self.fail {
                Err(SearchError::Status {
                    status: reqwest::StatusCode::TOO_MANY_REQUESTS,
                    body: "slow down".to_string(),
                })
            } else {
                Ok("[]".to_string())
            }
        }
    }

    fn state_with(provider: Option<Arc<RecordingProvider>>) -> ToolState {
        ToolState {
            nws: NwsClient::new(&ServerConfig::default()).unwrap(),
            search: provider.map(|p| p as Arc<dyn SearchProvider>),
        }
    }

    fn args(value: Value) -> HashMap<String, Value> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_clamp_count() {
        assert_eq!(clamp_count(3), 3);
        assert_eq!(clamp_count(20), 20);
        assert_eq!(clamp_count(50), 20);
        assert_eq!(clamp_count(0), 1);
        assert_eq!(clamp_count(-4), 1);
    }

    #[tokio::test]
    async fn test_count_clamped_to_twenty() {
        let provider = Arc::new(RecordingProvider::default());
        let state = state_with(Some(Arc::clone(&provider)));

        let result = brave_search(&state, &args(json!({"query": "test", "count": 50}))).await;

        assert_eq!(result.text(), "Search results for 'test':\n\n[]");
        assert_eq!(
            *provider.calls.lock().unwrap(),
            vec![("test".to_string(), 20)]
        );
    }

    #[tokio::test]
    async fn test_default_count() {
        let provider = Arc::new(RecordingProvider::default());
        let state = state_with(Some(Arc::clone(&provider)));

        brave_search(&state, &args(json!({"query": "weekend hikes"}))).await;
        assert_eq!(provider.calls.lock().unwrap()[0].1, 3);
    }

    #[tokio::test]
    async fn test_missing_api_key() {
        let state = state_with(None);
        let result = brave_search(&state, &args(json!({"query": "test"}))).await;

        assert_eq!(result.is_error, Some(false));
        assert_eq!(result.text(), MISSING_API_KEY_MESSAGE);
    }

    #[tokio::test]
    async fn test_provider_error_embedded() {
        let provider = Arc::new(RecordingProvider {
            fail: true,
            ..Default::default()
        });
        let state = state_with(Some(provider));

        let result = brave_search(&state, &args(json!({"query": "test"}))).await;
        assert_eq!(result.is_error, Some(false));
        assert!(result.text().starts_with("Error performing search: "));
        assert!(result.text().contains("slow down"));
    }

    #[tokio::test]
    async fn test_missing_query() {
        let state = state_with(None);
        let result = brave_search(&state, &HashMap::new()).await;
        assert_eq!(result.is_error, Some(true));
    }
}
