//! Clients for the remote services behind the FitCheck pipeline.
//!
//! Two collaborators are exposed behind traits so the orchestrator can be
//! driven by fakes in tests:
//! - [`Detector`]: finds people in an image ([`DetectorClient`] talks to a
//!   hosted object-detection workflow)
//! - [`Rater`]: scores one cropped person ([`RatingClient`] talks to the
//!   credential-holding relay, never to the rating service directly)

pub mod detector;
pub mod error;
pub mod rater;
pub mod types;

pub use detector::{Detector, DetectorClient, DetectorConfig};
pub use error::{ClientError, ClientResult};
pub use rater::{parse_rating_text, Rater, RaterConfig, RatingClient, RATING_PROMPT};
pub use types::RatingVerdict;
