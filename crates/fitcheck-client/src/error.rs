//! Client error types.

use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClientError {
    /// Network failure or non-success HTTP status.
    #[error("{}", transport_message(.status, .message))]
    Transport {
        status: Option<u16>,
        message: String,
    },

    /// The response did not have the expected structure.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The detection service answered correctly but found nobody.
    #[error("No people detected in the image")]
    NoDetections,

    /// The image payload was empty or not a supported encoding.
    #[error("Invalid image data: {0}")]
    InvalidImageData(String),

    /// The rating service reported an error of its own.
    #[error("Rating service error: {0}")]
    RatingService(String),
}

fn transport_message(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(code) => format!("Request failed with status {}: {}", code, message),
        None => format!("Request failed: {}", message),
    }
}

impl ClientError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            status: None,
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }

    pub fn invalid_image_data(message: impl Into<String>) -> Self {
        Self::InvalidImageData(message.into())
    }

    pub fn rating_service(message: impl Into<String>) -> Self {
        Self::RatingService(message.into())
    }

    /// Build a transport error from a non-success HTTP status.
    pub fn from_http_status(status: u16, body: impl Into<String>) -> Self {
        Self::Transport {
            status: Some(status),
            message: body.into(),
        }
    }

    /// HTTP status carried by a transport error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Transport { status, .. } => *status,
            _ => None,
        }
    }

    /// Taxonomy name used when presenting the error.
    pub fn kind(&self) -> &'static str {
        match self {
            ClientError::Transport { .. } => "TransportError",
            ClientError::MalformedResponse(_) => "MalformedResponseError",
            ClientError::NoDetections => "NoDetectionsError",
            ClientError::InvalidImageData(_) => "InvalidImageDataError",
            ClientError::RatingService(_) => "RatingServiceError",
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

impl From<fitcheck_media::MediaError> for ClientError {
    fn from(err: fitcheck_media::MediaError) -> Self {
        Self::InvalidImageData(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_http_status() {
        let err = ClientError::from_http_status(503, "Service Unavailable");
        assert_eq!(err.status(), Some(503));
        assert_eq!(err.kind(), "TransportError");
        assert_eq!(
            err.to_string(),
            "Request failed with status 503: Service Unavailable"
        );
    }

    #[test]
    fn test_transport_without_status() {
        let err = ClientError::transport("connection refused");
        assert_eq!(err.status(), None);
        assert_eq!(err.to_string(), "Request failed: connection refused");
    }

    #[test]
    fn test_kinds_are_distinct() {
        assert_eq!(ClientError::NoDetections.kind(), "NoDetectionsError");
        assert_eq!(ClientError::malformed("x").kind(), "MalformedResponseError");
        assert_eq!(ClientError::rating_service("x").kind(), "RatingServiceError");
        assert_eq!(
            ClientError::invalid_image_data("x").kind(),
            "InvalidImageDataError"
        );
    }
}
