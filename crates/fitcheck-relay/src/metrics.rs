//! Prometheus metrics for the relay.

use axum::body::Body;
use axum::extract::MatchedPath;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Instant;

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> PrometheusHandle {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "fitcheck_relay_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "fitcheck_relay_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "fitcheck_relay_http_requests_in_flight";

    // Rating service
    pub const UPSTREAM_REQUESTS_TOTAL: &str = "fitcheck_relay_upstream_requests_total";
    pub const UPSTREAM_DURATION_SECONDS: &str = "fitcheck_relay_upstream_duration_seconds";

    // Rate limiting
    pub const RATE_LIMIT_HITS_TOTAL: &str = "fitcheck_relay_rate_limit_hits_total";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", path.to_string()),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record one call to the rating service; `status` is the HTTP status or "error".
pub fn record_upstream(status: &str, duration_secs: f64) {
    let labels = [("status", status.to_string())];
    counter!(names::UPSTREAM_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::UPSTREAM_DURATION_SECONDS).record(duration_secs);
}

/// Record rate limit hit.
pub fn record_rate_limit_hit(endpoint: &str) {
    let labels = [("endpoint", endpoint.to_string())];
    counter!(names::RATE_LIMIT_HITS_TOTAL, &labels).increment(1);
}

/// Route template for labels, so unknown paths cannot blow up cardinality.
fn route_label(request: &Request<Body>) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string())
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = route_label(&request);
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &path, status, duration);

    response
}
