//! Pipeline error types.

use fitcheck_client::ClientError;
use fitcheck_models::RunFailure;
use thiserror::Error;

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Errors that abort a whole run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("No people detected in the image")]
    NoDetections,

    #[error("Detection failed: {0}")]
    Detection(ClientError),

    #[error("Crop extraction failed: {0}")]
    CropExtraction(String),

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub fn crop_extraction(msg: impl Into<String>) -> Self {
        Self::CropExtraction(msg.into())
    }

    pub fn invalid_image(msg: impl Into<String>) -> Self {
        Self::InvalidImage(msg.into())
    }

    /// Taxonomy name used when presenting the failure.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::NoDetections => "NoDetectionsError",
            PipelineError::Detection(inner) => inner.kind(),
            PipelineError::CropExtraction(_) => "CropExtractionError",
            PipelineError::InvalidImage(_) => "InvalidImageDataError",
            PipelineError::Io(_) => "IoError",
        }
    }

    /// Presentable form for run snapshots.
    pub fn to_failure(&self) -> RunFailure {
        RunFailure {
            kind: self.kind().to_string(),
            message: self.to_string(),
        }
    }
}

impl From<ClientError> for PipelineError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::NoDetections => PipelineError::NoDetections,
            other => PipelineError::Detection(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_detections_is_lifted() {
        let err: PipelineError = ClientError::NoDetections.into();
        assert!(matches!(err, PipelineError::NoDetections));
        assert_eq!(err.kind(), "NoDetectionsError");
    }

    #[test]
    fn test_detection_keeps_client_kind() {
        let err: PipelineError = ClientError::from_http_status(500, "oops").into();
        assert_eq!(err.kind(), "TransportError");
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn test_to_failure() {
        let failure = PipelineError::crop_extraction("no crops").to_failure();
        assert_eq!(failure.kind, "CropExtractionError");
        assert_eq!(failure.message, "Crop extraction failed: no crops");
    }
}
