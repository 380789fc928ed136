//! Brave Search API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::ACCEPT;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{SearchError, SearchProvider};
use crate::config::ServerConfig;

/// Header carrying the Brave API key.
const TOKEN_HEADER: &str = "X-Subscription-Token";

/// Client for the Brave web search endpoint.
#[derive(Debug, Clone)]
pub struct BraveClient {
    http: Client,
    base_url: String,
    api_key: String,
}

/// One rendered search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub link: String,
    pub snippet: String,
}

#[derive(Debug, Default, Deserialize)]
struct WebSearchResponse {
    #[serde(default)]
    web: Option<WebResults>,
}

#[derive(Debug, Default, Deserialize)]
struct WebResults {
    #[serde(default)]
    results: Vec<WebResult>,
}

#[derive(Debug, Deserialize)]
struct WebResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    extra_snippets: Vec<String>,
}

impl From<WebResult> for SearchHit {
    fn from(result: WebResult) -> Self {
        let snippet = result
            .description
            .into_iter()
            .chain(result.extra_snippets)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            title: result.title,
            link: result.url,
            snippet,
        }
    }
}

impl BraveClient {
    /// Build a client from the configured key.
    ///
    /// Returns `Ok(None)` when no key is configured.
    pub fn from_config(config: &ServerConfig) -> Result<Option<Self>, SearchError> {
        let Some(api_key) = config.brave_api_key.clone() else {
            return Ok(None);
        };

        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(config.request_timeout)
            .build()?;

        Ok(Some(Self {
            http,
            base_url: config.brave_base_url.clone(),
            api_key,
        }))
    }

    /// Run a query and return the decoded hits.
    pub async fn search_hits(&self, query: &str, count: u32) -> Result<Vec<SearchHit>, SearchError> {
        let url = format!("{}/web/search", self.base_url);
        debug!(query = %query, count, "querying Brave Search");
        let count = count.to_string();

        let response = self
            .http
            .get(&url)
            .query(&[("q", query), ("count", count.as_str())])
            .header(ACCEPT, "application/json")
            .header(TOKEN_HEADER, &self.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, "Brave Search returned error status");
            return Err(SearchError::Status { status, body });
        }

        let body = response.bytes().await?;
        let parsed: WebSearchResponse = serde_json::from_slice(&body)?;

        Ok(parsed
            .web
            .map(|web| web.results.into_iter().map(SearchHit::from).collect())
            .unwrap_or_default())
    }
}

#[async_trait]
impl SearchProvider for BraveClient {
    async fn search(&self, query: &str, count: u32) -> Result<String, SearchError> {
        let hits = self.search_hits(query, count).await?;
        Ok(serde_json::to_string(&hits)?)
    }
}
