//! Person detections.

use serde::{Deserialize, Serialize};

/// One located person as reported by the detection service.
///
/// `x` and `y` are the CENTER of the region in source-image pixels,
/// not its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Horizontal center of the region
    pub x: f64,
    /// Vertical center of the region
    pub y: f64,
    /// Region width in pixels
    pub width: f64,
    /// Region height in pixels
    pub height: f64,
    /// Detection confidence [0, 1]
    pub confidence: f64,
}

impl Detection {
    /// Create a new detection from center coordinates.
    pub fn new(x: f64, y: f64, width: f64, height: f64, confidence: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            confidence,
        }
    }

    /// Top-left corner of the region, floored at the image origin.
    pub fn top_left(&self) -> (f64, f64) {
        (
            (self.x - self.width / 2.0).max(0.0),
            (self.y - self.height / 2.0).max(0.0),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_left_from_center() {
        let det = Detection::new(100.0, 80.0, 40.0, 60.0, 0.9);
        assert_eq!(det.top_left(), (80.0, 50.0));
    }

    #[test]
    fn test_top_left_floors_at_origin() {
        let det = Detection::new(10.0, 5.0, 40.0, 60.0, 0.9);
        assert_eq!(det.top_left(), (0.0, 0.0));
    }

    #[test]
    fn test_deserialize_ignores_extra_fields() {
        let json = r#"{
            "x": 320.5, "y": 240.0, "width": 100.0, "height": 300.0,
            "confidence": 0.87, "class": "person", "class_id": 0,
            "detection_id": "a1b2"
        }"#;
        let det: Detection = serde_json::from_str(json).unwrap();
        assert_eq!(det.x, 320.5);
        assert_eq!(det.confidence, 0.87);
    }
}
