//! National Weather Service HTTP client.

use std::time::Duration;

use reqwest::Client;
use reqwest::header::{ACCEPT, USER_AGENT};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use super::types::{AlertsResponse, ForecastResponse, PointsResponse};
use crate::config::ServerConfig;

/// Media type the NWS API serves its GeoJSON products under.
const GEO_JSON: &str = "application/geo+json";

/// Errors that can occur when talking to the NWS API.
#[derive(Debug, Error)]
pub enum NwsError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status} from {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("response is missing {0}")]
    MissingField(&'static str),
}

/// Client for the NWS API.
///
/// Each call is a single GET with no retries. Callers treat every error
/// as "data unavailable".
#[derive(Debug, Clone)]
pub struct NwsClient {
    http: Client,
    base_url: String,
    user_agent: String,
}

impl NwsClient {
    pub fn new(config: &ServerConfig) -> Result<Self, NwsError> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: config.nws_base_url.clone(),
            user_agent: config.user_agent.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET a URL and decode its JSON body.
    pub async fn fetch<T: DeserializeOwned>(&self, url: &str) -> Result<T, NwsError> {
        debug!(url = %url, "fetching from NWS");

        let response = self
            .http
            .get(url)
            .header(USER_AGENT, &self.user_agent)
            .header(ACCEPT, GEO_JSON)
            .send()
            .await
            .inspect_err(|e| warn!(url = %url, error = %e, "NWS request failed"))?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %url, status = %status, "NWS returned error status");
            return Err(NwsError::Status {
                status,
                url: url.to_string(),
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| {
            warn!(url = %url, error = %e, "failed to decode NWS response");
            NwsError::Json(e)
        })
    }

    /// Active alerts for a two-letter state or territory code.
    pub async fn alerts_for_state(&self, state: &str) -> Result<AlertsResponse, NwsError> {
        let url = format!("{}/alerts/active/area/{}", self.base_url, state);
        self.fetch(&url).await
    }

    /// Active alerts whose area contains the given point.
    pub async fn alerts_for_point(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<AlertsResponse, NwsError> {
        let url = format!(
            "{}/alerts/active?point={},{}",
            self.base_url, latitude, longitude
        );
        self.fetch(&url).await
    }

    /// Grid metadata for a point, including its forecast URL.
    pub async fn points(&self, latitude: f64, longitude: f64) -> Result<PointsResponse, NwsError> {
        let url = format!("{}/points/{},{}", self.base_url, latitude, longitude);
        self.fetch(&url).await
    }

    /// Forecast from a URL obtained through [`NwsClient::points`].
    pub async fn forecast(&self, forecast_url: &str) -> Result<ForecastResponse, NwsError> {
        self.fetch(forecast_url).await
    }
}
