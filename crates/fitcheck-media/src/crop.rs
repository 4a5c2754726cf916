//! Person crop extraction.
//!
//! Converts center-based detections into pixel regions clamped to the
//! source image, renders each region into its own buffer and re-encodes
//! it as a JPEG data URL.

use fitcheck_models::{Crop, CropBox, Detection, PixelRegion};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GenericImageView};
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult};
use crate::image_data::to_data_url;

/// JPEG quality used for crops unless configured otherwise.
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Compute the rendered region for a detection.
///
/// The top-left corner is `max(0, center - extent / 2)` on each axis and the
/// extent is `min(extent, image_extent - corner)`. The result always lies
/// inside the image and is at least one pixel on each side, even when the
/// detection lies entirely outside the image.
pub fn clamp_region(detection: &Detection, image_width: u32, image_height: u32) -> PixelRegion {
    let (left, top) = detection.top_left();
    let (x, width) = clamp_axis(left, detection.width, image_width);
    let (y, height) = clamp_axis(top, detection.height, image_height);
    PixelRegion::new(x, y, width, height)
}

fn clamp_axis(start: f64, extent: f64, limit: u32) -> (u32, u32) {
    if limit == 0 {
        return (0, 0);
    }

    // `as u32` saturates: negatives and NaN become 0, overflow becomes u32::MAX
    let start_px = (start.floor() as u32).min(limit - 1);
    let available = limit - start_px;
    let extent_px = (extent.round() as u32).clamp(1, available);
    (start_px, extent_px)
}

/// Renders one crop per detection.
#[derive(Debug, Clone, Copy)]
pub struct CropExtractor {
    quality: u8,
}

impl Default for CropExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_JPEG_QUALITY)
    }
}

impl CropExtractor {
    /// Create an extractor with the given JPEG quality (1-100).
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Produce one crop per detection, in detection order.
    ///
    /// Returns an empty list when the source image cannot be decoded or a
    /// crop cannot be encoded; callers treat that as "no crops produced".
    pub fn extract(&self, image_bytes: &[u8], detections: &[Detection]) -> Vec<Crop> {
        let source = match image::load_from_memory(image_bytes) {
            Ok(img) => img,
            Err(e) => {
                warn!(error = %e, "Failed to decode source image for cropping");
                return Vec::new();
            }
        };

        let (image_width, image_height) = source.dimensions();
        if image_width == 0 || image_height == 0 {
            warn!("Source image has no pixels");
            return Vec::new();
        }

        let mut crops = Vec::with_capacity(detections.len());
        for (id, detection) in detections.iter().enumerate() {
            let region = clamp_region(detection, image_width, image_height);

            let image_data = match self.render(&source, region) {
                Ok(data) => data,
                Err(e) => {
                    warn!(crop_id = id, error = %e, "Failed to render crop");
                    return Vec::new();
                }
            };

            debug!(
                crop_id = id,
                x = region.x,
                y = region.y,
                width = region.width,
                height = region.height,
                "Rendered crop"
            );

            crops.push(Crop {
                id,
                image_data,
                bbox: CropBox {
                    x: detection.x,
                    y: detection.y,
                    width: region.width,
                    height: region.height,
                },
                region,
                confidence: detection.confidence,
            });
        }

        crops
    }

    fn render(&self, source: &DynamicImage, region: PixelRegion) -> MediaResult<String> {
        let cropped = source
            .crop_imm(region.x, region.y, region.width, region.height)
            .to_rgb8();

        let mut encoded = Vec::new();
        JpegEncoder::new_with_quality(&mut encoded, self.quality)
            .encode_image(&cropped)
            .map_err(|e| MediaError::encode(e.to_string()))?;

        Ok(to_data_url("image/jpeg", &encoded))
    }
}
