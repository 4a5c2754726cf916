//! Application state.

use std::sync::Arc;

use crate::config::RelayConfig;
use crate::error::RelayResult;
use crate::upstream::RatingUpstream;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RelayConfig>,
    pub upstream: Arc<RatingUpstream>,
}

impl AppState {
    /// Create new application state.
    pub fn new(config: RelayConfig) -> RelayResult<Self> {
        let upstream = RatingUpstream::new(&config)?;
        Ok(Self {
            config: Arc::new(config),
            upstream: Arc::new(upstream),
        })
    }
}
