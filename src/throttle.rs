//! Fixed-window request throttle applied per route group and client address.

use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;

use crate::{config::ThrottleSettings, error::AppError, state::SharedState};

/// One counting window.
#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Fixed-window counters keyed by route group and client address.
pub struct Throttle {
    settings: ThrottleSettings,
    windows: DashMap<(String, String), Window>,
}

impl Throttle {
    /// Empty throttle table with the configured limits.
    pub fn new(settings: ThrottleSettings) -> Self {
        Self {
            settings,
            windows: DashMap::new(),
        }
    }

    /// Limit and window applied to a request path.
    fn limits_for(&self, path: &str) -> (u32, Duration) {
        if path.starts_with("/authentication") {
            (self.settings.auth_limit, self.settings.auth_window)
        } else {
            (self.settings.default_limit, self.settings.default_window)
        }
    }

    /// Whether this request fits in the current window.
    pub fn allow(&self, group: &str, client: &str) -> bool {
        self.allow_at(group, client, Instant::now())
    }

    fn allow_at(&self, group: &str, client: &str, now: Instant) -> bool {
        let (limit, window) = self.limits_for(group);
        let mut slot = self
            .windows
            .entry((group.to_string(), client.to_string()))
            .or_insert(Window {
                started: now,
                count: 0,
            });

        if now.duration_since(slot.started) >= window {
            slot.started = now;
            slot.count = 0;
        }
        if slot.count >= limit {
            return false;
        }
        slot.count += 1;
        true
    }
}

/// Group key for a path: the first segment, so `/quiz/123` and `/quiz` share
/// a window.
fn route_group(path: &str) -> &str {
    let trimmed = path.trim_start_matches('/');
    match trimmed.find('/') {
        Some(end) => &path[..end + 1],
        None => path,
    }
}

/// Reject requests over the configured rate with `429`.
pub async fn throttle(
    State(state): State<SharedState>,
    request: Request,
    next: Next,
) -> Response {
    let group = route_group(request.uri().path()).to_string();
    let client = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .map(|value| value.split(',').next().unwrap_or(value).trim().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    if !state.throttle().allow(&group, &client) {
        return AppError::TooManyRequests.into_response();
    }
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> ThrottleSettings {
        ThrottleSettings {
            default_limit: 3,
            default_window: Duration::from_secs(60),
            auth_limit: 1,
            auth_window: Duration::from_secs(60),
        }
    }

    #[test]
    fn requests_within_the_limit_pass() {
        let throttle = Throttle::new(settings());
        let now = Instant::now();
        for _ in 0..3 {
            assert!(throttle.allow_at("/quiz", "1.2.3.4", now));
        }
        assert!(!throttle.allow_at("/quiz", "1.2.3.4", now));
    }

    #[test]
    fn windows_reset_after_their_duration() {
        let throttle = Throttle::new(settings());
        let now = Instant::now();
        for _ in 0..3 {
            assert!(throttle.allow_at("/quiz", "1.2.3.4", now));
        }
        assert!(!throttle.allow_at("/quiz", "1.2.3.4", now));
        let later = now + Duration::from_secs(61);
        assert!(throttle.allow_at("/quiz", "1.2.3.4", later));
    }

    #[test]
    fn clients_and_groups_are_counted_separately() {
        let throttle = Throttle::new(settings());
        let now = Instant::now();
        for _ in 0..3 {
            assert!(throttle.allow_at("/quiz", "1.2.3.4", now));
        }
        assert!(throttle.allow_at("/quiz", "5.6.7.8", now));
        assert!(throttle.allow_at("/play", "1.2.3.4", now));
    }

    #[test]
    fn authentication_routes_use_the_tighter_limit() {
        let throttle = Throttle::new(settings());
        let now = Instant::now();
        assert!(throttle.allow_at("/authentication", "1.2.3.4", now));
        assert!(!throttle.allow_at("/authentication", "1.2.3.4", now));
    }

    #[test]
    fn route_group_is_the_first_segment() {
        assert_eq!(route_group("/quiz/123"), "/quiz");
        assert_eq!(route_group("/quiz"), "/quiz");
        assert_eq!(route_group("/"), "/");
    }
}
