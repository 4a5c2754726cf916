//! Error types for image operations.

use thiserror::Error;

/// Result type for image operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while handling image data.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Invalid image data: {0}")]
    InvalidImageData(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to encode image: {0}")]
    Encode(String),
}

impl MediaError {
    pub fn invalid_image_data(message: impl Into<String>) -> Self {
        Self::InvalidImageData(message.into())
    }

    pub fn encode(message: impl Into<String>) -> Self {
        Self::Encode(message.into())
    }
}
