//! User-supplied source images.

use std::path::Path;
use std::sync::Arc;

use fitcheck_media::{encode_base64, inspect_image};

use crate::error::{PipelineError, PipelineResult};

/// An encoded image held in memory for one run.
#[derive(Debug, Clone)]
pub struct SourceImage {
    bytes: Arc<[u8]>,
    mime_type: &'static str,
}

impl SourceImage {
    /// Wrap encoded bytes, rejecting empty or unsupported images.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> PipelineResult<Self> {
        let bytes = bytes.into();
        let info = inspect_image(&bytes).map_err(|e| PipelineError::invalid_image(e.to_string()))?;
        Ok(Self {
            bytes: bytes.into(),
            mime_type: info.mime_type,
        })
    }

    /// Read an image file.
    pub async fn from_path(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let bytes = tokio::fs::read(path.as_ref()).await?;
        Self::from_bytes(bytes)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Cheap shared handle to the bytes.
    pub fn shared_bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }

    pub fn mime_type(&self) -> &'static str {
        self.mime_type
    }

    pub fn to_base64(&self) -> String {
        encode_base64(&self.bytes)
    }
}
