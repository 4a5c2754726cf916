//! Relay server for the FitCheck rating service.
//!
//! This crate provides:
//! - `POST /api/rate-outfit`, which forwards a rating request untouched and
//!   attaches the server-held credential
//! - Per-client rate limiting and security headers
//! - Prometheus metrics
//!
//! The credential never leaves this process; callers only see the rating
//! service's response.

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod rate_limit;
pub mod routes;
pub mod state;
pub mod upstream;

pub use config::{ApiKey, RelayConfig};
pub use error::{RelayError, RelayResult};
pub use rate_limit::ClientRateLimiter;
pub use routes::create_router;
pub use state::AppState;
pub use upstream::{RatingUpstream, UpstreamResponse};
