//! Outfit-rating client.
//!
//! Requests go to the relay, which attaches the rating-service credential.
//! This client never holds that credential.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use fitcheck_media::{decode_base64_payload, inspect_image, strip_data_url_prefix};
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{ClientError, ClientResult};
use crate::types::{RatingRequest, RatingVerdict};

/// Path of the forwarding endpoint on the relay.
pub const RELAY_RATE_PATH: &str = "/api/rate-outfit";

/// Score used when a free-text answer contains no number.
pub const DEFAULT_SCORE: f64 = 5.0;

/// Prompt sent with every crop.
pub const RATING_PROMPT: &str = r#"You are a friendly but honest fashion stylist. Rate the outfit worn by the person in this photo on a scale from 1 to 10, considering fit, color coordination, and overall style.

Respond with ONLY a JSON object in exactly this format and nothing else:
{"score": <integer from 1 to 10>, "feedback": "<two or three sentences of specific, constructive feedback>"}"#;

/// "8/10", "7.5 / 10"
static OUT_OF_TEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*/\s*10\b").unwrap());

/// First run of digits that starts a word. Also matches "10th", which is a
/// known source of wrong scores.
static ANY_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(\d+)").unwrap());

/// Scores one cropped person.
#[async_trait]
pub trait Rater: Send + Sync {
    /// Rate a crop given as base64 or a data URL.
    async fn rate(&self, image_data: &str) -> ClientResult<RatingVerdict>;

    /// Rater name for logging.
    fn name(&self) -> &'static str;
}

/// Configuration for the rating client.
#[derive(Debug, Clone)]
pub struct RaterConfig {
    /// Base URL of the relay
    pub relay_url: String,
    /// Model identifier requested from the rating service
    pub model: String,
    /// Token budget for the answer
    pub max_tokens: u32,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for RaterConfig {
    fn default() -> Self {
        Self {
            relay_url: "http://localhost:3001".to_string(),
            model: "claude-3-5-sonnet-latest".to_string(),
            max_tokens: 1024,
            timeout: Duration::from_secs(60),
        }
    }
}

impl RaterConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            relay_url: std::env::var("RELAY_URL").unwrap_or(defaults.relay_url),
            model: std::env::var("RATING_MODEL").unwrap_or(defaults.model),
            max_tokens: std::env::var("RATING_MAX_TOKENS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_tokens),
            timeout: std::env::var("RATING_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}{}", self.relay_url.trim_end_matches('/'), RELAY_RATE_PATH)
    }
}

/// Client that rates crops through the relay.
pub struct RatingClient {
    http: Client,
    config: RaterConfig,
}

impl RatingClient {
    /// Create a new rating client.
    pub fn new(config: RaterConfig) -> ClientResult<Self> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> ClientResult<Self> {
        Self::new(RaterConfig::from_env())
    }
}

#[async_trait]
impl Rater for RatingClient {
    async fn rate(&self, image_data: &str) -> ClientResult<RatingVerdict> {
        let payload = strip_data_url_prefix(image_data);
        let bytes = decode_base64_payload(payload)?;
        let info = inspect_image(&bytes)?;

        let request = RatingRequest::for_image(
            &self.config.model,
            self.config.max_tokens,
            info.mime_type,
            payload,
            RATING_PROMPT,
        );

        let url = self.config.endpoint();
        debug!(url = %url, bytes = bytes.len(), "Sending rating request");

        let response = self.http.post(&url).json(&request).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        interpret_response(status, &body)
    }

    fn name(&self) -> &'static str {
        "relay"
    }
}

/// Turn a relay response into a verdict.
///
/// Precedence: explicit service error, then missing content wrapper, then
/// strict JSON, then free-text extraction.
pub fn interpret_response(status: u16, body: &str) -> ClientResult<RatingVerdict> {
    let success = (200..300).contains(&status);

    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(e) if success => {
            return Err(ClientError::malformed(format!(
                "rating response is not JSON: {}",
                e
            )))
        }
        Err(_) => return Err(ClientError::from_http_status(status, body)),
    };

    if let Some(error) = value.get("error").filter(|e| !e.is_null()) {
        return Err(ClientError::rating_service(error_message(error)));
    }

    if !success {
        return Err(ClientError::from_http_status(status, body));
    }

    let text = value
        .get("content")
        .and_then(Value::as_array)
        .and_then(|blocks| blocks.first())
        .and_then(|block| block.get("text"))
        .and_then(Value::as_str)
        .ok_or_else(|| ClientError::malformed("missing content[0].text"))?;

    Ok(parse_rating_text(text))
}

fn error_message(error: &Value) -> String {
    match error {
        Value::String(message) => message.clone(),
        Value::Object(fields) => fields
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string()),
        other => other.to_string(),
    }
}

#[derive(Deserialize)]
struct StrictRating {
    score: f64,
    feedback: String,
}

/// Parse the model's answer.
///
/// Strict `{"score", "feedback"}` JSON is returned unmodified. Anything else
/// falls back to pulling a number out of the text, clamped to [1, 10], with
/// the whole text as feedback.
pub fn parse_rating_text(text: &str) -> RatingVerdict {
    if let Ok(strict) = serde_json::from_str::<StrictRating>(text) {
        return RatingVerdict {
            score: strict.score,
            feedback: strict.feedback,
        };
    }

    let score = match extract_score(text) {
        Some(score) => score.clamp(1.0, 10.0),
        None => {
            warn!("No score found in rating text, using default");
            DEFAULT_SCORE
        }
    };

    RatingVerdict {
        score,
        feedback: text.to_string(),
    }
}

fn extract_score(text: &str) -> Option<f64> {
    OUT_OF_TEN
        .captures(text)
        .or_else(|| ANY_NUMBER.captures(text))
        .and_then(|caps| caps[1].parse().ok())
}
