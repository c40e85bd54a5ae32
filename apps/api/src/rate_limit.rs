//! Per-client-IP request limiting for the `/api` routes.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use tracing::warn;

use crate::state::AppState;

pub type IpRateLimiter = DefaultKeyedRateLimiter<IpAddr>;

/// 20 requests per IP in any 15 minute window.
pub const MAX_REQUESTS_PER_WINDOW: u32 = 20;
pub const WINDOW: Duration = Duration::from_secs(15 * 60);

pub const RATE_LIMIT_MESSAGE: &str = "Too many requests from this IP, please try again later.";

/// Builds a limiter that allows `max_requests` back to back and then refills one
/// slot every `window / max_requests`.
pub fn build_rate_limiter(max_requests: NonZeroU32, window: Duration) -> Arc<IpRateLimiter> {
    let period = (window / max_requests.get()).max(Duration::from_millis(1));
    let quota = Quota::with_period(period)
        .unwrap_or_else(|| Quota::per_second(max_requests))
        .allow_burst(max_requests);
    Arc::new(RateLimiter::keyed(quota))
}

pub fn default_rate_limiter() -> Arc<IpRateLimiter> {
    let max = NonZeroU32::new(MAX_REQUESTS_PER_WINDOW).unwrap_or(NonZeroU32::MIN);
    build_rate_limiter(max, WINDOW)
}

/// Middleware: rejects with 429 once the caller's IP has used its quota.
/// Requests without connection info (in-process tests) share a single bucket.
pub async fn enforce_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

    if state.rate_limiter.check_key(&ip).is_err() {
        warn!(%ip, path = %request.uri().path(), "Rate limit exceeded");
        return (StatusCode::TOO_MANY_REQUESTS, RATE_LIMIT_MESSAGE).into_response();
    }

    next.run(request).await
}

/// Drops idle per-IP buckets every `every` so the key map doesn't grow unbounded.
pub fn spawn_cleanup(limiter: Arc<IpRateLimiter>, every: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            limiter.retain_recent();
            limiter.shrink_to_fit();
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_then_reject() {
        let limiter = build_rate_limiter(NonZeroU32::new(3).unwrap(), WINDOW);
        let ip = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
        for _ in 0..3 {
            assert!(limiter.check_key(&ip).is_ok());
        }
        assert!(limiter.check_key(&ip).is_err());
    }

    #[test]
    fn test_ips_have_independent_buckets() {
        let limiter = build_rate_limiter(NonZeroU32::new(1).unwrap(), WINDOW);
        let a = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
        let b = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2));
        assert!(limiter.check_key(&a).is_ok());
        assert!(limiter.check_key(&a).is_err());
        assert!(limiter.check_key(&b).is_ok());
    }

    #[test]
    fn test_default_allows_twenty() {
        let limiter = default_rate_limiter();
        let ip = IpAddr::V4(Ipv4Addr::LOCALHOST);
        for _ in 0..MAX_REQUESTS_PER_WINDOW {
            assert!(limiter.check_key(&ip).is_ok());
        }
        assert!(limiter.check_key(&ip).is_err());
    }
}
