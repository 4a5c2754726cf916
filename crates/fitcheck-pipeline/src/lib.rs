//! FitCheck pipeline.
//!
//! This crate provides:
//! - The run orchestrator (detect, crop, rate serially, publish snapshots)
//! - Source image loading
//! - Run logging and metrics
//!
//! The `fitcheck` binary drives one run from the command line.

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod orchestrator;
pub mod source;

pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult};
pub use logging::RunLogger;
pub use orchestrator::{Orchestrator, RunOutcome};
pub use source::SourceImage;
