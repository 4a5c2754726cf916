//! Per-crop style ratings.

use serde::{Deserialize, Serialize};

use crate::Crop;

/// Outcome of rating one crop.
///
/// `score` is `None` exactly when `failed` is true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    /// Matches the originating crop id
    pub id: usize,
    pub score: Option<f64>,
    pub feedback: String,
    pub crop: Crop,
    pub failed: bool,
}

impl Rating {
    /// A successful rating.
    pub fn scored(crop: Crop, score: f64, feedback: impl Into<String>) -> Self {
        Self {
            id: crop.id,
            score: Some(score),
            feedback: feedback.into(),
            crop,
            failed: false,
        }
    }

    /// A failed rating carrying a feedback message derived from the error.
    pub fn failed(crop: Crop, feedback: impl Into<String>) -> Self {
        Self {
            id: crop.id,
            score: None,
            feedback: feedback.into(),
            crop,
            failed: true,
        }
    }
}

/// Aggregate view of a finished rating list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingSummary {
    pub total: usize,
    pub rated: usize,
    pub failed: usize,
    /// Mean score over successful ratings, if any succeeded
    pub mean_score: Option<f64>,
}

impl RatingSummary {
    pub fn from_ratings(ratings: &[Rating]) -> Self {
        let scores: Vec<f64> = ratings.iter().filter_map(|r| r.score).collect();
        let mean_score = if scores.is_empty() {
            None
        } else {
            Some(scores.iter().sum::<f64>() / scores.len() as f64)
        };

        Self {
            total: ratings.len(),
            rated: scores.len(),
            failed: ratings.iter().filter(|r| r.failed).count(),
            mean_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CropBox, PixelRegion};

    fn crop(id: usize) -> Crop {
        Crop {
            id,
            image_data: String::new(),
            bbox: CropBox {
                x: 0.0,
                y: 0.0,
                width: 1,
                height: 1,
            },
            region: PixelRegion::new(0, 0, 1, 1),
            confidence: 0.9,
        }
    }

    #[test]
    fn test_failed_rating_has_no_score() {
        let rating = Rating::failed(crop(3), "Failed to rate: timeout");
        assert_eq!(rating.id, 3);
        assert!(rating.failed);
        assert!(rating.score.is_none());
    }

    #[test]
    fn test_summary() {
        let ratings = vec![
            Rating::scored(crop(0), 6.0, "fine"),
            Rating::failed(crop(1), "boom"),
            Rating::scored(crop(2), 8.0, "sharp"),
        ];
        let summary = RatingSummary::from_ratings(&ratings);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.rated, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.mean_score, Some(7.0));
    }

    #[test]
    fn test_summary_all_failed() {
        let summary = RatingSummary::from_ratings(&[Rating::failed(crop(0), "x")]);
        assert_eq!(summary.mean_score, None);
    }
}
