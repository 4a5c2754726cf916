//! Outfit rating relay handler.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use tracing::{error, info};

use crate::error::RelayResult;
use crate::state::AppState;

/// Forward a rating request to the rating service.
///
/// The body is passed through without parsing and the service's status and
/// body come back unchanged. Only a transport failure produces a relay error.
pub async fn rate_outfit(State(state): State<AppState>, body: Bytes) -> RelayResult<Response> {
    let request_bytes = body.len();

    let upstream = state.upstream.forward(body).await.map_err(|e| {
        error!(error = %e, request_bytes, "Rating service unreachable");
        e
    })?;

    info!(
        status = upstream.status.as_u16(),
        request_bytes,
        response_bytes = upstream.body.len(),
        "Relayed rating request"
    );

    Ok((
        upstream.status,
        [(CONTENT_TYPE, "application/json")],
        upstream.body,
    )
        .into_response())
}
