//! Fixed-window rate limiting for every route
//!
//! Each client identity gets a window that starts at its first request;
//! up to `max_requests` are allowed until the window expires, then the
//! count starts over. Counters are in memory only.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use shared::error::AppError;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::state::AppState;

const RATELIMIT_LIMIT: &str = "ratelimit-limit";
const RATELIMIT_REMAINING: &str = "ratelimit-remaining";
const RATELIMIT_RESET: &str = "ratelimit-reset";

struct WindowEntry {
    count: u32,
    window_start: Instant,
}

/// Outcome of counting one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    /// Time until the current window ends
    pub reset_after: Duration,
}

#[derive(Clone)]
pub struct RateLimiter {
    /// identity -> current window
    inner: Arc<Mutex<HashMap<String, WindowEntry>>>,
    max_requests: u32,
    window: Duration,
    trusted_proxy_hops: usize,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration, trusted_proxy_hops: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            max_requests,
            window,
            trusted_proxy_hops,
        }
    }

    /// Count a request for `identity` now.
    pub async fn check(&self, identity: &str) -> RateLimitDecision {
        self.check_at(identity, Instant::now()).await
    }

    async fn check_at(&self, identity: &str, now: Instant) -> RateLimitDecision {
        let mut map = self.inner.lock().await;

        let entry = map.entry(identity.to_owned()).or_insert_with(|| WindowEntry {
            count: 0,
            window_start: now,
        });

        // Reset window if expired
        if now.duration_since(entry.window_start) >= self.window {
            entry.count = 0;
            entry.window_start = now;
        }

        entry.count = entry.count.saturating_add(1);

        let elapsed = now.duration_since(entry.window_start);
        RateLimitDecision {
            allowed: entry.count <= self.max_requests,
            limit: self.max_requests,
            remaining: self.max_requests.saturating_sub(entry.count),
            reset_after: self.window.saturating_sub(elapsed),
        }
    }

    /// Remove identities whose window has expired
    pub async fn cleanup(&self) {
        self.cleanup_at(Instant::now()).await;
    }

    async fn cleanup_at(&self, now: Instant) {
        let mut map = self.inner.lock().await;
        map.retain(|_, entry| now.duration_since(entry.window_start) < self.window);
    }

    /// Derive the client identity from the forwarding chain.
    pub fn client_identity(&self, headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok());
        resolve_client_ip(forwarded, peer, self.trusted_proxy_hops)
    }
}

/// Pick the client address, trusting `hops` proxies.
///
/// The chain is the X-Forwarded-For entries followed by the peer address;
/// the client is the entry `hops` positions from the right, clamped to the
/// leftmost one. With zero hops only the peer address counts.
fn resolve_client_ip(forwarded: Option<&str>, peer: Option<SocketAddr>, hops: usize) -> String {
    let peer = peer
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_owned());

    if hops == 0 {
        return peer;
    }

    let mut chain: Vec<String> = forwarded
        .into_iter()
        .flat_map(|v| v.split(','))
        .map(|ip| ip.trim())
        .filter(|ip| !ip.is_empty())
        .map(str::to_owned)
        .collect();
    chain.push(peer);

    let index = chain.len() - 1 - hops.min(chain.len() - 1);
    chain.swap_remove(index)
}

fn header_value(n: u64) -> HeaderValue {
    HeaderValue::from(n)
}

fn apply_headers(response: &mut Response, decision: &RateLimitDecision) {
    let reset_secs = decision.reset_after.as_secs_f64().ceil() as u64;
    let headers = response.headers_mut();
    headers.insert(RATELIMIT_LIMIT, header_value(decision.limit.into()));
    headers.insert(RATELIMIT_REMAINING, header_value(decision.remaining.into()));
    headers.insert(RATELIMIT_RESET, header_value(reset_secs));
    if !decision.allowed {
        headers.insert(axum::http::header::RETRY_AFTER, header_value(reset_secs));
    }
}

/// Rate limit middleware: counts every request and sets the standard headers.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0);
    let identity = state.rate_limiter.client_identity(request.headers(), peer);
    let decision = state.rate_limiter.check(&identity).await;

    let mut response = if decision.allowed {
        next.run(request).await
    } else {
        tracing::warn!(client = %identity, "Rate limit exceeded");
        AppError::new(shared::error::ErrorCode::RateLimited).into_response()
    };
    apply_headers(&mut response, &decision);
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> Option<SocketAddr> {
        Some(s.parse().unwrap())
    }

    #[tokio::test]
    async fn test_fixed_window_threshold() {
        let limiter = RateLimiter::new(120, Duration::from_secs(60), 0);
        let start = Instant::now();

        for i in 1..=120 {
            let decision = limiter.check_at("10.0.0.1", start).await;
            assert!(decision.allowed, "request {i} should pass");
        }
        let decision = limiter.check_at("10.0.0.1", start).await;
        assert!(!decision.allowed);
        assert_eq!(decision.remaining, 0);
    }

    #[tokio::test]
    async fn test_window_restarts_after_expiry() {
        let limiter = RateLimiter::new(2, Duration::from_secs(60), 0);
        let start = Instant::now();

        assert!(limiter.check_at("a", start).await.allowed);
        assert!(limiter.check_at("a", start).await.allowed);
        assert!(!limiter.check_at("a", start + Duration::from_secs(59)).await.allowed);

        let decision = limiter.check_at("a", start + Duration::from_secs(60)).await;
        assert!(decision.allowed);
        assert_eq!(decision.remaining, 1);
        assert_eq!(decision.reset_after, Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_window_starts_at_first_request_per_identity() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60), 0);
        let start = Instant::now();

        assert!(limiter.check_at("a", start).await.allowed);
        let later = start + Duration::from_secs(30);
        let decision = limiter.check_at("b", later).await;
        assert!(decision.allowed);
        assert_eq!(decision.reset_after, Duration::from_secs(60));

        let decision = limiter.check_at("a", later).await;
        assert!(!decision.allowed);
        assert_eq!(decision.reset_after, Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_remaining_counts_down() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60), 0);
        let start = Instant::now();
        let mut remaining = Vec::new();
        for _ in 0..4 {
            remaining.push(limiter.check_at("a", start).await.remaining);
        }
        assert_eq!(remaining, vec![2, 1, 0, 0]);
    }

    #[tokio::test]
    async fn test_cleanup_drops_expired_windows() {
        let limiter = RateLimiter::new(5, Duration::from_secs(60), 0);
        let start = Instant::now();
        limiter.check_at("stale", start).await;
        let later = start + Duration::from_secs(90);
        limiter.check_at("fresh", later).await;

        limiter.cleanup_at(later).await;
        let map = limiter.inner.lock().await;
        assert!(!map.contains_key("stale"));
        assert!(map.contains_key("fresh"));
    }

    #[test]
    fn test_zero_hops_uses_peer_only() {
        let ip = resolve_client_ip(Some("1.1.1.1"), addr("10.0.0.9:5000"), 0);
        assert_eq!(ip, "10.0.0.9");
        assert_eq!(resolve_client_ip(None, None, 0), "unknown");
    }

    #[test]
    fn test_trusted_hops_walk_from_the_right() {
        let xff = Some("203.0.113.7, 198.51.100.2");
        assert_eq!(
            resolve_client_ip(xff, addr("10.0.0.1:443"), 1),
            "198.51.100.2"
        );
        assert_eq!(
            resolve_client_ip(xff, addr("10.0.0.1:443"), 2),
            "203.0.113.7"
        );
        // More hops than entries clamps to the leftmost address
        assert_eq!(
            resolve_client_ip(xff, addr("10.0.0.1:443"), 9),
            "203.0.113.7"
        );
    }

    #[test]
    fn test_trusted_hops_without_forwarded_header() {
        assert_eq!(resolve_client_ip(None, addr("10.0.0.1:443"), 1), "10.0.0.1");
    }
}
