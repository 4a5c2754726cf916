//! Pipeline configuration.

use fitcheck_client::{DetectorConfig, RaterConfig};
use fitcheck_media::DEFAULT_JPEG_QUALITY;

/// Configuration for one orchestrator.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub detector: DetectorConfig,
    pub rater: RaterConfig,
    /// JPEG quality for rendered crops
    pub crop_quality: u8,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            detector: DetectorConfig::default(),
            rater: RaterConfig::default(),
            crop_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            detector: DetectorConfig::from_env(),
            rater: RaterConfig::from_env(),
            crop_quality: std::env::var("CROP_JPEG_QUALITY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_JPEG_QUALITY),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.crop_quality, 90);
        assert_eq!(config.rater.relay_url, "http://localhost:3001");
    }
}
