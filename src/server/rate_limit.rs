//! Sliding-window request limit per client IP.

use super::AppState;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use dashmap::DashMap;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::{Duration, Instant};

// Idle clients are swept once per this many checks.
const PRUNE_EVERY: u64 = 1024;

#[derive(Debug)]
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    hits: DashMap<IpAddr, VecDeque<Instant>>,
    checks: AtomicU64,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self { max_requests, window, hits: DashMap::new(), checks: AtomicU64::new(0) }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Count a request from `ip` at `now`, unless `ip` already made
    /// `max_requests` requests inside the window ending at `now`. Rejected
    /// requests are not counted.
    pub fn check_at(&self, ip: IpAddr, now: Instant) -> bool {
        if self.checks.fetch_add(1, Ordering::Relaxed) % PRUNE_EVERY == PRUNE_EVERY - 1 {
            self.prune_idle(now);
        }
        let mut hits = self.hits.entry(ip).or_default();
        while let Some(&oldest) = hits.front() {
            if now.saturating_duration_since(oldest) < self.window {
                break;
            }
            hits.pop_front();
        }
        if hits.len() >= self.max_requests {
            return false;
        }
        hits.push_back(now);
        true
    }

    pub fn check(&self, ip: IpAddr) -> bool {
        self.check_at(ip, Instant::now())
    }

    /// Forget clients with no request inside the window ending at `now`.
    pub fn prune_idle(&self, now: Instant) {
        self.hits.retain(|_, hits| {
            hits.back().is_some_and(|&last| now.saturating_duration_since(last) < self.window)
        });
    }

    /// Number of clients with a live bucket.
    pub fn tracked_clients(&self) -> usize {
        self.hits.len()
    }
}

// Without a peer address (e.g. a router driven in-process) all requests share one bucket.
fn client_ip(req: &Request) -> IpAddr {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED), |ConnectInfo(addr)| addr.ip())
}

pub(super) async fn enforce(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let ip = client_ip(&req);
    if !state.limiter.check(ip) {
        tracing::warn!(%ip, "rate limit exceeded");
        let body = json!({
            "error": "Too many requests, please try again later.",
            "retryAfter": format!("{} seconds", state.limiter.window().as_secs()),
        });
        return (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
    }
    next.run(req).await
}
