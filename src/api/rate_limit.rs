//! Per-client fixed-window request limiting for the `/api` routes.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use super::{ApiError, AppState};
use crate::cache::Clock;

/// Above this many tracked clients, stale windows are swept on insert.
const SWEEP_THRESHOLD: usize = 10_000;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub reset_after: Duration,
}

pub struct FixedWindowLimiter {
    windows: Mutex<HashMap<String, Window>>,
    clock: Arc<dyn Clock>,
    window: Duration,
    max_requests: u32,
}

impl FixedWindowLimiter {
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, window: Duration, max_requests: u32) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            clock,
            window,
            max_requests,
        }
    }

    /// Counts one request from `client` and reports whether it may proceed.
    pub async fn check(&self, client: &str) -> Decision {
        let now = self.clock.now();
        let mut windows = self.windows.lock().await;

        if windows.len() > SWEEP_THRESHOLD {
            let span = self.window;
            windows.retain(|_, w| now.duration_since(w.started) < span);
        }

        let window = windows.entry(client.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.duration_since(window.started) >= self.window {
            *window = Window {
                started: now,
                count: 0,
            };
        }

        let allowed = window.count < self.max_requests;
        if allowed {
            window.count += 1;
        }

        Decision {
            allowed,
            limit: self.max_requests,
            remaining: self.max_requests.saturating_sub(window.count),
            reset_after: self
                .window
                .saturating_sub(now.duration_since(window.started)),
        }
    }
}

fn client_key(request: &Request) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or_else(|| "unknown".to_string(), |info| info.0.ip().to_string())
}

fn insert_headers(headers: &mut HeaderMap, decision: &Decision) {
    let reset = decision.reset_after;
    let reset_secs = reset.as_secs() + u64::from(reset.subsec_nanos() > 0);
    headers.insert("ratelimit-limit", HeaderValue::from(decision.limit));
    headers.insert("ratelimit-remaining", HeaderValue::from(decision.remaining));
    headers.insert("ratelimit-reset", HeaderValue::from(reset_secs));
    if !decision.allowed {
        headers.insert("retry-after", HeaderValue::from(reset_secs));
    }
}

pub async fn rate_limit(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let Some(limiter) = state.shared.rate_limiter.as_ref() else {
        return next.run(request).await;
    };

    let client = client_key(&request);
    let decision = limiter.check(&client).await;

    let mut response = if decision.allowed {
        next.run(request).await
    } else {
        tracing::warn!(client = %client, "Rate limit exceeded");
        ApiError::RateLimited.into_response()
    };

    insert_headers(response.headers_mut(), &decision);
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;

    fn limiter(max: u32) -> (FixedWindowLimiter, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        (
            FixedWindowLimiter::new(clock.clone(), Duration::from_secs(60), max),
            clock,
        )
    }

    #[tokio::test]
    async fn test_allows_up_to_max_then_rejects() {
        let (limiter, _) = limiter(3);

        for expected_remaining in [2, 1, 0] {
            let decision = limiter.check("10.0.0.1").await;
            assert!(decision.allowed);
            assert_eq!(decision.remaining, expected_remaining);
        }

        let decision = limiter.check("10.0.0.1").await;
        assert!(!decision.allowed);
        assert_eq!(decision.remaining, 0);
    }

    #[tokio::test]
    async fn test_clients_are_counted_separately() {
        let (limiter, _) = limiter(1);
        assert!(limiter.check("a").await.allowed);
        assert!(!limiter.check("a").await.allowed);
        assert!(limiter.check("b").await.allowed);
    }

    #[tokio::test]
    async fn test_window_resets() {
        let (limiter, clock) = limiter(1);
        assert!(limiter.check("a").await.allowed);

        clock.advance(Duration::from_secs(59));
        let decision = limiter.check("a").await;
        assert!(!decision.allowed);
        assert_eq!(decision.reset_after, Duration::from_secs(1));

        clock.advance(Duration::from_secs(1));
        assert!(limiter.check("a").await.allowed);
    }

    #[test]
    fn test_reset_header_rounds_partial_seconds_up() {
        let mut headers = HeaderMap::new();
        insert_headers(
            &mut headers,
            &Decision {
                allowed: false,
                limit: 5,
                remaining: 0,
                reset_after: Duration::from_millis(59_500),
            },
        );
        assert_eq!(headers["ratelimit-reset"], "60");
        assert_eq!(headers["retry-after"], "60");

        let mut headers = HeaderMap::new();
        insert_headers(
            &mut headers,
            &Decision {
                allowed: true,
                limit: 5,
                remaining: 4,
                reset_after: Duration::from_secs(42),
            },
        );
        assert_eq!(headers["ratelimit-reset"], "42");
        assert!(headers.get("retry-after").is_none());
    }
}
