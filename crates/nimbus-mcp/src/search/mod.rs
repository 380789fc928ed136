//! Web search providers.

mod brave;

use async_trait::async_trait;
use thiserror::Error;

pub use brave::{BraveClient, SearchHit};

/// Errors that can occur when querying a search provider.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("search provider returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A provider that turns a query into a rendered result blob.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run a query and return at most `count` results, already rendered.
    async fn search(&self, query: &str, count: u32) -> Result<String, SearchError>;
}
