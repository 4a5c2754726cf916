//! Image handling for the FitCheck pipeline.
//!
//! This crate provides:
//! - Raster probing and validation of user-supplied images
//! - Base64 and data-URL encoding helpers
//! - The crop extractor that renders one JPEG per detected person

pub mod crop;
pub mod error;
pub mod image_data;

pub use crop::{clamp_region, CropExtractor, DEFAULT_JPEG_QUALITY};
pub use error::{MediaError, MediaResult};
pub use image_data::{
    decode_base64_payload, encode_base64, inspect_image, strip_data_url_prefix, to_data_url,
    ImageInfo,
};
