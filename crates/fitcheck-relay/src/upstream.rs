//! Client for the rating service behind the relay.

use std::time::Instant;

use axum::body::Bytes;
use axum::http::StatusCode;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::{debug, warn};

use crate::config::{ApiKey, RelayConfig};
use crate::error::{RelayError, RelayResult};
use crate::metrics;

/// Raw answer from the rating service.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

/// Forwards request bodies to the rating service with the credential attached.
#[derive(Debug, Clone)]
pub struct RatingUpstream {
    http: Client,
    url: String,
    api_key: ApiKey,
    api_version: String,
}

impl RatingUpstream {
    pub fn new(config: &RelayConfig) -> RelayResult<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| RelayError::internal(format!("Failed to build HTTP client: {}", e)))?;

        if config.api_key.is_empty() {
            warn!("RATING_API_KEY is not set, rating requests will be rejected upstream");
        }

        Ok(Self {
            http,
            url: config.rating_service_url.clone(),
            api_key: config.api_key.clone(),
            api_version: config.api_version.clone(),
        })
    }

    /// Send `body` as-is and return whatever the service answered.
    ///
    /// Only transport problems are errors; any HTTP status is a response.
    pub async fn forward(&self, body: Bytes) -> RelayResult<UpstreamResponse> {
        let started = Instant::now();
        let size = body.len();

        let result = self.send(body).await;
        let duration = started.elapsed().as_secs_f64();

        match &result {
            Ok(response) => {
                debug!(
                    status = response.status.as_u16(),
                    request_bytes = size,
                    response_bytes = response.body.len(),
                    "Rating service responded"
                );
                metrics::record_upstream(&response.status.as_u16().to_string(), duration);
            }
            Err(_) => metrics::record_upstream("error", duration),
        }

        result
    }

    async fn send(&self, body: Bytes) -> RelayResult<UpstreamResponse> {
        let response = self
            .http
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .header("x-api-key", self.api_key.expose())
            .header("anthropic-version", &self.api_version)
            .body(body)
            .send()
            .await?;

        let status = StatusCode::from_u16(response.status().as_u16())
            .map_err(|e| RelayError::upstream(e.to_string()))?;
        let body = response.bytes().await?;

        Ok(UpstreamResponse { status, body })
    }
}
