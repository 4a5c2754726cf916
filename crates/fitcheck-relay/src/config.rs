//! Relay configuration.

use std::fmt;
use std::time::Duration;

/// Default rating service endpoint.
pub const DEFAULT_RATING_SERVICE_URL: &str = "https://api.anthropic.com/v1/messages";

/// Default value for the `anthropic-version` header.
pub const DEFAULT_RATING_API_VERSION: &str = "2023-06-01";

/// Secret credential for the rating service. Never printed.
#[derive(Clone, Default)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw key, for the outbound header only.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("ApiKey(<unset>)")
        } else {
            f.write_str("ApiKey(<redacted>)")
        }
    }
}

/// Relay server configuration.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Rating service credential
    pub api_key: ApiKey,
    /// Rating service endpoint
    pub rating_service_url: String,
    /// `anthropic-version` header value
    pub api_version: String,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Rate limit requests per second, per client IP
    pub rate_limit_rps: u32,
    /// Take the client IP from forwarding headers (only behind a trusted proxy)
    pub trust_proxy: bool,
    /// Timeout for the upstream call
    pub request_timeout: Duration,
    /// Max request body size
    pub max_body_size: usize,
    /// Environment (development/production)
    pub environment: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            api_key: ApiKey::default(),
            rating_service_url: DEFAULT_RATING_SERVICE_URL.to_string(),
            api_version: DEFAULT_RATING_API_VERSION.to_string(),
            cors_origins: vec!["*".to_string()],
            rate_limit_rps: 5,
            trust_proxy: false,
            request_timeout: Duration::from_secs(60),
            max_body_size: 10 * 1024 * 1024, // 10MB
            environment: "development".to_string(),
        }
    }
}

impl RelayConfig {
    /// Create config from environment variables.
    ///
    /// A missing `RATING_API_KEY` is not an error here; the upstream call
    /// fails instead and its response is relayed.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("RELAY_HOST").unwrap_or(defaults.host),
            port: std::env::var("RELAY_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            api_key: ApiKey::new(std::env::var("RATING_API_KEY").unwrap_or_default()),
            rating_service_url: std::env::var("RATING_SERVICE_URL")
                .unwrap_or(defaults.rating_service_url),
            api_version: std::env::var("RATING_API_VERSION").unwrap_or(defaults.api_version),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(defaults.cors_origins),
            rate_limit_rps: std::env::var("RATE_LIMIT_RPS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.rate_limit_rps),
            trust_proxy: std::env::var("TRUST_PROXY")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.trust_proxy),
            request_timeout: std::env::var("REQUEST_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            max_body_size: std::env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_body_size),
            environment: std::env::var("ENVIRONMENT").unwrap_or(defaults.environment),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RelayConfig::default();
        assert_eq!(config.port, 3001);
        assert_eq!(config.rating_service_url, DEFAULT_RATING_SERVICE_URL);
        assert!(config.api_key.is_empty());
        assert!(!config.trust_proxy);
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = RelayConfig {
            api_key: ApiKey::new("sk-very-secret"),
            ..RelayConfig::default()
        };
        let printed = format!("{:?}", config);
        assert!(!printed.contains("sk-very-secret"));
        assert!(printed.contains("<redacted>"));
    }
}
