//! Cropped person images.

use serde::{Deserialize, Serialize};

/// A pixel rectangle inside a source image, anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRegion {
    /// Create a new pixel region.
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge.
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    /// Check that the region is non-empty and lies inside `[0, width) x [0, height)`.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.width > 0 && self.height > 0 && self.right() <= width && self.bottom() <= height
    }
}

/// Bounding box reported alongside a crop.
///
/// `x` and `y` are the detection's center coordinates as reported by the
/// detection service; `width` and `height` are the clamped extents that
/// were actually rendered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropBox {
    pub x: f64,
    pub y: f64,
    pub width: u32,
    pub height: u32,
}

/// A rendered sub-image for one detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Crop {
    /// Zero-based index matching the detection order
    pub id: usize,
    /// JPEG data URL of the clamped crop region
    pub image_data: String,
    /// Detection center plus rendered extents
    pub bbox: CropBox,
    /// Region of the source image that was rendered
    pub region: PixelRegion,
    /// Confidence copied from the detection
    pub confidence: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_edges() {
        let region = PixelRegion::new(10, 20, 30, 40);
        assert_eq!(region.right(), 40);
        assert_eq!(region.bottom(), 60);
    }

    #[test]
    fn test_region_fits_within() {
        assert!(PixelRegion::new(0, 0, 100, 50).fits_within(100, 50));
        assert!(!PixelRegion::new(1, 0, 100, 50).fits_within(100, 50));
        assert!(!PixelRegion::new(0, 0, 0, 50).fits_within(100, 50));
    }

    #[test]
    fn test_crop_serializes_camel_case() {
        let crop = Crop {
            id: 0,
            image_data: "data:image/jpeg;base64,AAAA".to_string(),
            bbox: CropBox {
                x: 50.0,
                y: 50.0,
                width: 20,
                height: 20,
            },
            region: PixelRegion::new(40, 40, 20, 20),
            confidence: 0.5,
        };
        let json = serde_json::to_value(&crop).unwrap();
        assert!(json.get("imageData").is_some());
        assert!(json.get("image_data").is_none());
    }
}
