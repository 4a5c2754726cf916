//! Pipeline run identity, phases and published snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::Rating;

/// Unique identifier for a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub String);

impl RunId {
    /// Generate a new random run ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Phase of the current run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum RunPhase {
    /// Nothing in flight
    #[default]
    Idle,
    /// Waiting on the detection service
    Detecting,
    /// Decoding the source image and rendering crops
    Cropping,
    /// Rating crop `index` of `total`
    Rating { index: usize, total: usize },
    /// Every crop has a rating
    Done,
    /// The run aborted
    Failed,
}

impl RunPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunPhase::Idle => "idle",
            RunPhase::Detecting => "detecting",
            RunPhase::Cropping => "cropping",
            RunPhase::Rating { .. } => "rating",
            RunPhase::Done => "done",
            RunPhase::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RunPhase::Done | RunPhase::Failed)
    }

    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            RunPhase::Detecting | RunPhase::Cropping | RunPhase::Rating { .. }
        )
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunPhase::Rating { index, total } => write!(f, "rating {}/{}", index + 1, total),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Why a run failed, in presentable form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunFailure {
    /// Error taxonomy name, e.g. `NoDetectionsError`
    pub kind: String,
    /// Human-readable message
    pub message: String,
}

/// Everything a presentation layer needs to render the current run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RunSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<RunId>,
    #[serde(flatten)]
    pub phase: RunPhase,
    /// Ratings published so far, in crop order
    pub ratings: Vec<Rating>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RunFailure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl RunSnapshot {
    /// Fresh idle state for a newly started run.
    pub fn started(run_id: RunId) -> Self {
        let now = Utc::now();
        Self {
            run_id: Some(run_id),
            phase: RunPhase::Idle,
            ratings: Vec::new(),
            error: None,
            started_at: Some(now),
            updated_at: Some(now),
        }
    }

    /// Move to a new phase.
    pub fn enter(&mut self, phase: RunPhase) {
        self.phase = phase;
        self.updated_at = Some(Utc::now());
    }

    /// Append a finished rating.
    pub fn push_rating(&mut self, rating: Rating) {
        self.ratings.push(rating);
        self.updated_at = Some(Utc::now());
    }

    /// Enter the failed phase. Partial results are dropped.
    pub fn fail(&mut self, failure: RunFailure) {
        self.ratings.clear();
        self.error = Some(failure);
        self.enter(RunPhase::Failed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_id_unique() {
        assert_ne!(RunId::new(), RunId::new());
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(RunPhase::Rating { index: 0, total: 3 }.to_string(), "rating 1/3");
        assert_eq!(RunPhase::Detecting.to_string(), "detecting");
    }

    #[test]
    fn test_phase_flags() {
        assert!(RunPhase::Done.is_terminal());
        assert!(RunPhase::Failed.is_terminal());
        assert!(!RunPhase::Idle.is_busy());
        assert!(RunPhase::Cropping.is_busy());
    }

    #[test]
    fn test_snapshot_serializes_flat_phase() {
        let mut snapshot = RunSnapshot::started(RunId::new());
        snapshot.enter(RunPhase::Rating { index: 1, total: 2 });
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["phase"], "rating");
        assert_eq!(json["index"], 1);
        assert_eq!(json["total"], 2);
    }

    #[test]
    fn test_fail_clears_ratings() {
        let mut snapshot = RunSnapshot::started(RunId::new());
        snapshot.fail(RunFailure {
            kind: "NoDetectionsError".to_string(),
            message: "No people detected in the image".to_string(),
        });
        assert_eq!(snapshot.phase, RunPhase::Failed);
        assert!(snapshot.ratings.is_empty());
        assert!(snapshot.error.is_some());
    }
}
