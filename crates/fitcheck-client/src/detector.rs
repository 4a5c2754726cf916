//! Person-detection service client.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use fitcheck_media::{decode_base64_payload, inspect_image, strip_data_url_prefix};
use fitcheck_models::Detection;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{ClientError, ClientResult};
use crate::types::{DetectInputs, DetectRequest};

/// Finds people in an image.
#[async_trait]
pub trait Detector: Send + Sync {
    /// Detect people in a base64-encoded image (a data-URL prefix is allowed).
    ///
    /// Returns at least one detection or an error; an empty result is
    /// reported as [`ClientError::NoDetections`].
    async fn detect(&self, image_base64: &str) -> ClientResult<Vec<Detection>>;

    /// Detector name for logging.
    fn name(&self) -> &'static str;
}

/// Configuration for the detection client.
#[derive(Clone)]
pub struct DetectorConfig {
    /// Full URL of the hosted detection workflow
    pub model_url: String,
    /// API key sent in the request body
    pub api_key: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            model_url: String::new(),
            api_key: String::new(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl fmt::Debug for DetectorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DetectorConfig")
            .field("model_url", &self.model_url)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl DetectorConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            model_url: std::env::var("DETECTOR_MODEL_URL").unwrap_or_default(),
            api_key: std::env::var("DETECTOR_API_KEY").unwrap_or_default(),
            timeout: Duration::from_secs(
                std::env::var("DETECTOR_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        }
    }
}

/// Client for the hosted detection workflow.
pub struct DetectorClient {
    http: Client,
    config: DetectorConfig,
}

impl DetectorClient {
    /// Create a new detection client.
    pub fn new(config: DetectorConfig) -> ClientResult<Self> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> ClientResult<Self> {
        Self::new(DetectorConfig::from_env())
    }
}

#[async_trait]
impl Detector for DetectorClient {
    async fn detect(&self, image_base64: &str) -> ClientResult<Vec<Detection>> {
        let payload = strip_data_url_prefix(image_base64);
        let bytes = decode_base64_payload(payload)?;
        inspect_image(&bytes)?;

        debug!(url = %self.config.model_url, bytes = bytes.len(), "Sending detection request");

        let request = DetectRequest {
            inputs: DetectInputs { image: payload },
            api_key: &self.config.api_key,
        };

        let response = self
            .http
            .post(&self.config.model_url)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let reason = status.canonical_reason().unwrap_or("Unknown");
            return Err(ClientError::from_http_status(
                status.as_u16(),
                format!("{} {}", reason, body).trim_end().to_string(),
            ));
        }

        let body = response.text().await?;
        let value: Value = serde_json::from_str(&body)
            .map_err(|e| ClientError::malformed(format!("detection response is not JSON: {}", e)))?;

        let detections = parse_detections(&value)?;
        info!(count = detections.len(), "Detection complete");
        Ok(detections)
    }

    fn name(&self) -> &'static str {
        "workflow"
    }
}

/// Extract detections from a workflow response.
///
/// Expects `outputs[0]` to hold a `predictions` list, either directly or
/// wrapped one level deeper as `predictions.predictions`.
pub fn parse_detections(value: &Value) -> ClientResult<Vec<Detection>> {
    let first = value
        .get("outputs")
        .and_then(Value::as_array)
        .and_then(|outputs| outputs.first())
        .ok_or_else(|| ClientError::malformed("missing outputs[0]"))?;

    let predictions = match first.get("predictions") {
        Some(Value::Array(list)) => list,
        Some(Value::Object(inner)) => inner
            .get("predictions")
            .and_then(Value::as_array)
            .ok_or_else(|| ClientError::malformed("missing predictions list"))?,
        _ => return Err(ClientError::malformed("missing predictions list")),
    };

    let detections = predictions
        .iter()
        .map(|p| serde_json::from_value::<Detection>(p.clone()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ClientError::malformed(format!("invalid prediction: {}", e)))?;

    if detections.is_empty() {
        return Err(ClientError::NoDetections);
    }

    Ok(detections)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fitcheck_media::encode_base64;
    use serde_json::json;
    use std::io::Cursor;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn png_base64() -> String {
        let img = image::RgbImage::from_pixel(8, 8, image::Rgb([1, 2, 3]));
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageOutputFormat::Png)
            .unwrap();
        encode_base64(&buf)
    }

    fn client_for(server: &MockServer) -> DetectorClient {
        DetectorClient::new(DetectorConfig {
            model_url: format!("{}/infer/workflows/acme/people", server.uri()),
            api_key: "detector-key".to_string(),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    fn prediction(x: f64) -> Value {
        json!({
            "x": x, "y": 50.0, "width": 20.0, "height": 40.0,
            "confidence": 0.9, "class": "person"
        })
    }

    #[test]
    fn test_config_defaults() {
        let config = DetectorConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.model_url.is_empty());
    }

    #[test]
    fn test_config_debug_redacts_key() {
        let config = DetectorConfig {
            api_key: "super-secret".to_string(),
            ..Default::default()
        };
        assert!(!format!("{:?}", config).contains("super-secret"));
    }

    #[test]
    fn test_parse_nested_predictions() {
        let value = json!({
            "outputs": [{
                "predictions": {
                    "image": {"width": 640, "height": 480},
                    "predictions": [prediction(10.0), prediction(30.0)]
                }
            }]
        });
        let detections = parse_detections(&value).unwrap();
        assert_eq!(detections.len(), 2);
        assert_eq!(detections[0].x, 10.0);
        assert_eq!(detections[1].x, 30.0);
    }

    #[test]
    fn test_parse_flat_predictions() {
        let value = json!({ "outputs": [{ "predictions": [prediction(10.0)] }] });
        assert_eq!(parse_detections(&value).unwrap().len(), 1);
    }

    #[test]
    fn test_parse_empty_is_no_detections() {
        let value = json!({ "outputs": [{ "predictions": { "predictions": [] } }] });
        assert_eq!(parse_detections(&value), Err(ClientError::NoDetections));
    }

    #[test]
    fn test_parse_missing_structure_is_malformed() {
        for value in [
            json!({}),
            json!({ "outputs": [] }),
            json!({ "outputs": [{ "other": 1 }] }),
            json!({ "outputs": [{ "predictions": { "nope": [] } }] }),
            json!({ "outputs": [{ "predictions": [{ "x": "left" }] }] }),
        ] {
            assert!(
                matches!(parse_detections(&value), Err(ClientError::MalformedResponse(_))),
                "{}",
                value
            );
        }
    }

    #[tokio::test]
    async fn test_detect_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/infer/workflows/acme/people"))
            .and(body_partial_json(json!({ "api_key": "detector-key" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "outputs": [{ "predictions": { "predictions": [prediction(12.0)] } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let detections = client_for(&server)
            .detect(&format!("data:image/png;base64,{}", png_base64()))
            .await
            .unwrap();
        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].x, 12.0);
    }

    #[tokio::test]
    async fn test_detect_sends_payload_without_prefix() {
        let server = MockServer::start().await;
        let image = png_base64();
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "inputs": { "image": image.clone() } })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "outputs": [{ "predictions": [prediction(1.0)] }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .detect(&format!("data:image/png;base64,{}", image))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_detect_http_error_is_transport() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let err = client_for(&server).detect(&png_base64()).await.unwrap_err();
        assert_eq!(err.status(), Some(401));
        assert!(err.to_string().contains("Unauthorized"));
    }

    #[tokio::test]
    async fn test_detect_non_json_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).detect(&png_base64()).await.unwrap_err();
        assert!(matches!(err, ClientError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_detect_empty_is_no_detections() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "outputs": [{ "predictions": { "predictions": [] } }]
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).detect(&png_base64()).await.unwrap_err();
        assert_eq!(err, ClientError::NoDetections);
    }

    #[tokio::test]
    async fn test_detect_rejects_non_image_before_sending() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.detect("").await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidImageData(_)));

        let err = client
            .detect(&encode_base64(b"just some text"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidImageData(_)));
    }

    #[tokio::test]
    async fn test_detect_unreachable_is_transport() {
        let client = DetectorClient::new(DetectorConfig {
            model_url: "http://127.0.0.1:1/infer".to_string(),
            api_key: String::new(),
            timeout: Duration::from_secs(2),
        })
        .unwrap();

        let err = client.detect(&png_base64()).await.unwrap_err();
        assert!(matches!(err, ClientError::Transport { status: None, .. }));
    }
}
