//! Detect, crop and rate orchestration.
//!
//! One run moves through `Idle -> Detecting -> Cropping -> Rating(i) -> Done`,
//! or ends in `Failed` when detection or cropping goes wrong. Crops are rated
//! one at a time in index order; a failed rating is recorded on that crop and
//! the loop moves on.
//!
//! Starting a new run supersedes whatever run is in flight. Nothing is
//! cancelled; the older run notices on its next state update and stops
//! without publishing.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use fitcheck_client::{ClientResult, Detector, DetectorClient, Rater, RatingClient};
use fitcheck_media::CropExtractor;
use fitcheck_models::{Rating, RunId, RunPhase, RunSnapshot};
use tokio::sync::watch;
use tracing::Instrument;

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::logging::RunLogger;
use crate::metrics;
use crate::source::SourceImage;

/// How a run ended.
#[derive(Debug)]
pub enum RunOutcome {
    /// Every crop has a rating, in crop order
    Done(Vec<Rating>),
    /// Detection or cropping failed; nothing partial is kept
    Failed(PipelineError),
    /// A newer run started before this one finished
    Superseded,
}

impl RunOutcome {
    pub fn is_done(&self) -> bool {
        matches!(self, RunOutcome::Done(_))
    }

    pub fn ratings(&self) -> Option<&[Rating]> {
        match self {
            RunOutcome::Done(ratings) => Some(ratings),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&PipelineError> {
        match self {
            RunOutcome::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Runs the pipeline and publishes its state.
pub struct Orchestrator<D, R> {
    detector: D,
    rater: R,
    extractor: CropExtractor,
    generation: AtomicU64,
    state: watch::Sender<RunSnapshot>,
}

impl Orchestrator<DetectorClient, RatingClient> {
    /// Wire the HTTP clients from configuration.
    pub fn from_config(config: PipelineConfig) -> ClientResult<Self> {
        Ok(Self::with_extractor(
            DetectorClient::new(config.detector)?,
            RatingClient::new(config.rater)?,
            CropExtractor::new(config.crop_quality),
        ))
    }
}

impl<D: Detector, R: Rater> Orchestrator<D, R> {
    pub fn new(detector: D, rater: R) -> Self {
        Self::with_extractor(detector, rater, CropExtractor::default())
    }

    pub fn with_extractor(detector: D, rater: R, extractor: CropExtractor) -> Self {
        let (state, _) = watch::channel(RunSnapshot::default());
        Self {
            detector,
            rater,
            extractor,
            generation: AtomicU64::new(0),
            state,
        }
    }

    /// Current state of the latest run.
    pub fn snapshot(&self) -> RunSnapshot {
        self.state.borrow().clone()
    }

    /// Receive every state change of the latest run.
    pub fn subscribe(&self) -> watch::Receiver<RunSnapshot> {
        self.state.subscribe()
    }

    /// Drop all state and supersede any in-flight run.
    pub fn reset(&self) {
        self.state.send_modify(|snapshot| {
            self.generation.fetch_add(1, Ordering::SeqCst);
            *snapshot = RunSnapshot::default();
        });
    }

    /// Run the whole pipeline for one image.
    pub async fn run(&self, image: SourceImage) -> RunOutcome {
        let run_id = RunId::new();

        // Claim a generation and replace the snapshot under the same lock so
        // concurrent starts cannot interleave.
        let mut generation = 0;
        self.state.send_modify(|snapshot| {
            generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *snapshot = RunSnapshot::started(run_id.clone());
        });

        let logger = RunLogger::new(&run_id, "detecting");
        logger.log_start(&format!(
            "{} bytes of {} via {} / {}",
            image.bytes().len(),
            image.mime_type(),
            self.detector.name(),
            self.rater.name()
        ));
        metrics::record_run_started();

        let span = logger.create_span();
        let outcome = self.execute(generation, &image, &logger).instrument(span).await;

        match &outcome {
            RunOutcome::Done(ratings) => {
                metrics::record_run_completed();
                let failed = ratings.iter().filter(|r| r.failed).count();
                logger.log_completion(&format!(
                    "{} ratings ({} failed)",
                    ratings.len(),
                    failed
                ));
            }
            RunOutcome::Failed(err) => metrics::record_run_failed(err.kind()),
            RunOutcome::Superseded => {
                metrics::record_run_superseded();
                logger.log_warning("superseded by a newer run, results discarded");
            }
        }

        outcome
    }

    async fn execute(&self, generation: u64, image: &SourceImage, logger: &RunLogger) -> RunOutcome {
        if !self.publish(generation, |s| s.enter(RunPhase::Detecting)) {
            return RunOutcome::Superseded;
        }

        let started = Instant::now();
        let detected = self.detector.detect(&image.to_base64()).await;
        metrics::record_stage_duration("detecting", started.elapsed().as_secs_f64());

        if !self.is_current(generation) {
            return RunOutcome::Superseded;
        }

        let detections = match detected {
            Ok(detections) if !detections.is_empty() => detections,
            Ok(_) => return self.fail(generation, PipelineError::NoDetections, logger),
            Err(e) => return self.fail(generation, e.into(), logger),
        };
        logger.log_progress(&format!("{} people detected", detections.len()));

        let logger = logger.for_stage("cropping");
        if !self.publish(generation, |s| s.enter(RunPhase::Cropping)) {
            return RunOutcome::Superseded;
        }

        let started = Instant::now();
        let extractor = self.extractor;
        let bytes = image.shared_bytes();
        let cropped =
            tokio::task::spawn_blocking(move || extractor.extract(&bytes, &detections)).await;
        metrics::record_stage_duration("cropping", started.elapsed().as_secs_f64());

        if !self.is_current(generation) {
            return RunOutcome::Superseded;
        }

        let crops = match cropped {
            Ok(crops) if !crops.is_empty() => crops,
            Ok(_) => {
                return self.fail(
                    generation,
                    PipelineError::crop_extraction("no crops could be extracted from the image"),
                    &logger,
                )
            }
            Err(e) => {
                return self.fail(generation, PipelineError::crop_extraction(e.to_string()), &logger)
            }
        };

        let logger = logger.for_stage("rating");
        let total = crops.len();
        let mut ratings = Vec::with_capacity(total);

        for (index, crop) in crops.into_iter().enumerate() {
            if !self.publish(generation, |s| s.enter(RunPhase::Rating { index, total })) {
                return RunOutcome::Superseded;
            }

            let started = Instant::now();
            let verdict = self.rater.rate(&crop.image_data).await;
            metrics::record_stage_duration("rating", started.elapsed().as_secs_f64());

            if !self.is_current(generation) {
                return RunOutcome::Superseded;
            }

            let rating = match verdict {
                Ok(verdict) => {
                    metrics::record_rating("scored");
                    Rating::scored(crop, verdict.score, verdict.feedback)
                }
                Err(e) => {
                    metrics::record_rating("failed");
                    logger.log_warning(&format!("crop {} could not be rated: {}", index, e));
                    Rating::failed(crop, format!("Could not rate this outfit: {}", e))
                }
            };

            let published = rating.clone();
            if !self.publish(generation, move |s| s.push_rating(published)) {
                return RunOutcome::Superseded;
            }
            ratings.push(rating);
        }

        if !self.publish(generation, |s| s.enter(RunPhase::Done)) {
            return RunOutcome::Superseded;
        }

        RunOutcome::Done(ratings)
    }

    fn fail(&self, generation: u64, error: PipelineError, logger: &RunLogger) -> RunOutcome {
        let failure = error.to_failure();
        if !self.publish(generation, move |s| s.fail(failure)) {
            return RunOutcome::Superseded;
        }
        logger.log_error(&error.to_string());
        RunOutcome::Failed(error)
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Apply `update` only if `generation` is still the latest run.
    fn publish(&self, generation: u64, update: impl FnOnce(&mut RunSnapshot)) -> bool {
        let mut current = false;
        self.state.send_if_modified(|snapshot| {
            current = self.is_current(generation);
            if current {
                update(snapshot);
            }
            current
        });
        current
    }
}
