//! Process-wide configuration for the upstream clients.

use std::time::Duration;

/// Default National Weather Service API base URL.
pub const DEFAULT_NWS_BASE_URL: &str = "https://api.weather.gov";

/// Default Brave Search API base URL.
pub const DEFAULT_BRAVE_BASE_URL: &str = "https://api.search.brave.com/res/v1";

/// User agent sent to the NWS API, which rejects anonymous clients.
pub const DEFAULT_USER_AGENT: &str = "weather-app/1.0";

/// Per-request timeout for outbound calls.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration established once at startup and read-only afterwards.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub nws_base_url: String,
    pub user_agent: String,
    pub request_timeout: Duration,
    /// Brave Search API key. `None` disables the search tool.
    pub brave_api_key: Option<String>,
    pub brave_base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            nws_base_url: DEFAULT_NWS_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            brave_api_key: None,
            brave_base_url: DEFAULT_BRAVE_BASE_URL.to_string(),
        }
    }
}

impl ServerConfig {
    /// Set the Brave Search API key. Blank keys count as unset.
    pub fn with_brave_api_key(mut self, key: Option<String>) -> Self {
        self.brave_api_key = key.filter(|k| !k.trim().is_empty());
        self
    }

    pub fn with_nws_base_url(mut self, url: impl Into<String>) -> Self {
        self.nws_base_url = trim_base(url.into());
        self
    }

    pub fn with_brave_base_url(mut self, url: impl Into<String>) -> Self {
        self.brave_base_url = trim_base(url.into());
        self
    }
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
