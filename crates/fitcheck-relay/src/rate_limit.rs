//! Per-client rate limiting for the forwarding route.
//!
//! Clients are keyed by the socket peer address. Forwarding headers are only
//! consulted when the relay is configured to sit behind a trusted proxy;
//! otherwise a caller could pick a fresh key for every request.

use std::net::{IpAddr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::{Request, Response};
use axum::middleware::Next;
use axum::response::IntoResponse;
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use tracing::{debug, warn};

use crate::error::RelayError;
use crate::metrics;

/// Keys tracked before idle clients are pruned.
const PRUNE_THRESHOLD: usize = 10_000;

/// Keyed governor limiter plus the rule for finding the client address.
pub struct ClientRateLimiter {
    limiter: DefaultKeyedRateLimiter<IpAddr>,
    trust_proxy: bool,
}

impl ClientRateLimiter {
    /// `requests_per_second` of zero is treated as one.
    pub fn new(requests_per_second: u32, trust_proxy: bool) -> Self {
        let rps = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
        Self {
            limiter: RateLimiter::keyed(Quota::per_second(rps)),
            trust_proxy,
        }
    }

    /// Take one request from `ip`'s budget.
    pub fn check(&self, ip: IpAddr) -> bool {
        if self.limiter.len() >= PRUNE_THRESHOLD {
            self.limiter.retain_recent();
            self.limiter.shrink_to_fit();
        }
        self.limiter.check_key(&ip).is_ok()
    }

    /// Number of client addresses with live state.
    pub fn tracked_clients(&self) -> usize {
        self.limiter.len()
    }

    /// Address the budget is charged to.
    ///
    /// Behind a trusted proxy this is the last `X-Forwarded-For` hop (the
    /// one the proxy appended), then `X-Real-IP`. The socket peer is used
    /// otherwise, and as the fallback.
    pub fn client_ip(&self, request: &Request<Body>) -> Option<IpAddr> {
        if self.trust_proxy {
            if let Some(ip) = forwarded_ip(request) {
                return Some(ip);
            }
        }

        request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
    }
}

fn forwarded_ip(request: &Request<Body>) -> Option<IpAddr> {
    let headers = request.headers();

    headers
        .get("X-Forwarded-For")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.rsplit(',').next())
        .and_then(|s| s.trim().parse().ok())
        .or_else(|| {
            headers
                .get("X-Real-IP")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse().ok())
        })
}

/// Reject requests over the client's budget with 429.
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<ClientRateLimiter>>,
    request: Request<Body>,
    next: Next,
) -> Response<Body> {
    let Some(ip) = limiter.client_ip(&request) else {
        debug!("No client address available, skipping rate limit");
        return next.run(request).await;
    };

    if !limiter.check(ip) {
        warn!(ip = %ip, "Rate limit exceeded");
        metrics::record_rate_limit_hit(request.uri().path());
        return RelayError::RateLimited.into_response();
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_from(peer: &str, forwarded_for: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder();
        if let Some(value) = forwarded_for {
            builder = builder.header("X-Forwarded-For", value);
        }
        let mut request = builder.body(Body::empty()).unwrap();
        let addr: SocketAddr = peer.parse().unwrap();
        request.extensions_mut().insert(ConnectInfo(addr));
        request
    }

    #[test]
    fn test_blocks_after_burst() {
        let limiter = ClientRateLimiter::new(2, false);
        let ip: IpAddr = "10.0.0.1".parse().unwrap();

        assert!(limiter.check(ip));
        assert!(limiter.check(ip));
        assert!(!limiter.check(ip));
    }

    #[test]
    fn test_budget_is_per_client() {
        let limiter = ClientRateLimiter::new(1, false);
        let a: IpAddr = "10.0.0.1".parse().unwrap();
        let b: IpAddr = "10.0.0.2".parse().unwrap();

        assert!(limiter.check(a));
        assert!(!limiter.check(a));
        assert!(limiter.check(b));
        assert_eq!(limiter.tracked_clients(), 2);
    }

    #[test]
    fn test_forwarding_headers_ignored_by_default() {
        let limiter = ClientRateLimiter::new(1, false);
        let request = request_from("198.51.100.4:5000", Some("203.0.113.7"));

        assert_eq!(
            limiter.client_ip(&request),
            Some("198.51.100.4".parse().unwrap())
        );
    }

    #[test]
    fn test_trusted_proxy_uses_last_forwarded_hop() {
        let limiter = ClientRateLimiter::new(1, true);
        let request = request_from("10.0.0.9:5000", Some("1.2.3.4, 203.0.113.7"));

        assert_eq!(
            limiter.client_ip(&request),
            Some("203.0.113.7".parse().unwrap())
        );
    }

    #[test]
    fn test_trusted_proxy_falls_back_to_peer() {
        let limiter = ClientRateLimiter::new(1, true);
        let request = request_from("10.0.0.9:5000", Some("not-an-ip"));

        assert_eq!(limiter.client_ip(&request), Some("10.0.0.9".parse().unwrap()));
    }

    #[test]
    fn test_no_peer_no_key() {
        let limiter = ClientRateLimiter::new(1, false);
        let request = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(limiter.client_ip(&request), None);
    }
}
