//! Pipeline metrics.
//!
//! Recorded through the `metrics` facade; they are no-ops unless the host
//! process installs a recorder.

use metrics::{counter, histogram};

/// Metric names as constants for consistency.
pub mod names {
    pub const RUNS_STARTED_TOTAL: &str = "fitcheck_runs_started_total";
    pub const RUNS_COMPLETED_TOTAL: &str = "fitcheck_runs_completed_total";
    pub const RUNS_FAILED_TOTAL: &str = "fitcheck_runs_failed_total";
    pub const RUNS_SUPERSEDED_TOTAL: &str = "fitcheck_runs_superseded_total";
    pub const RATINGS_TOTAL: &str = "fitcheck_ratings_total";
    pub const STAGE_DURATION_SECONDS: &str = "fitcheck_stage_duration_seconds";
}

pub fn record_run_started() {
    counter!(names::RUNS_STARTED_TOTAL).increment(1);
}

pub fn record_run_completed() {
    counter!(names::RUNS_COMPLETED_TOTAL).increment(1);
}

/// Record a failed run, labelled by error kind.
pub fn record_run_failed(kind: &str) {
    let labels = [("kind", kind.to_string())];
    counter!(names::RUNS_FAILED_TOTAL, &labels).increment(1);
}

pub fn record_run_superseded() {
    counter!(names::RUNS_SUPERSEDED_TOTAL).increment(1);
}

/// Record one rating outcome ("scored" or "failed").
pub fn record_rating(outcome: &str) {
    let labels = [("outcome", outcome.to_string())];
    counter!(names::RATINGS_TOTAL, &labels).increment(1);
}

/// Record how long a stage took.
pub fn record_stage_duration(stage: &str, duration_secs: f64) {
    let labels = [("stage", stage.to_string())];
    histogram!(names::STAGE_DURATION_SECONDS, &labels).record(duration_secs);
}
