//! Shared data models for the FitCheck rating pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Person detections reported by the detection service
//! - Cropped person images and their pixel regions
//! - Per-crop style ratings
//! - Pipeline run phases and published snapshots

pub mod crop;
pub mod detection;
pub mod rating;
pub mod run;

// Re-export common types
pub use crop::{Crop, CropBox, PixelRegion};
pub use detection::Detection;
pub use rating::{Rating, RatingSummary};
pub use run::{RunFailure, RunId, RunPhase, RunSnapshot};
