//! Fixed-window per-user request throttle.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use taskpilot_core::ids::UserId;

/// One user's usage inside the current window.
#[derive(Clone, Copy, Debug)]
struct WindowState {
    window_start: Instant,
    count: u32,
}

/// Outcome of a check-and-record call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RateDecision {
    /// Request admitted and counted.
    Allowed,
    /// Budget exhausted; wait this long for the window to roll over.
    Limited {
        /// Always positive and at most the window length.
        retry_after: Duration,
    },
}

/// Fixed-window throttle keyed by user id.
///
/// Check and record happen under one map entry lock, so concurrent calls for
/// the same user cannot both sneak into the last slot.
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    states: DashMap<UserId, WindowState>,
}

impl RateLimiter {
    /// Throttle allowing `limit` requests per `window` per user.
    #[must_use]
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            states: DashMap::new(),
        }
    }

    /// Admit or reject a request for this user, counting it if admitted.
    pub fn check_and_record(&self, user: &UserId) -> RateDecision {
        self.check_and_record_at(user, Instant::now())
    }

    fn check_and_record_at(&self, user: &UserId, now: Instant) -> RateDecision {
        let mut entry = self.states.entry(user.clone()).or_insert(WindowState {
            window_start: now,
            count: 0,
        });

        if now.duration_since(entry.window_start) >= self.window {
            entry.window_start = now;
            entry.count = 0;
        }

        if entry.count >= self.limit {
            let elapsed = now.duration_since(entry.window_start);
            let remaining = self.window.saturating_sub(elapsed);
            // Guard the positive-wait contract even right at the boundary.
            let retry_after = if remaining.is_zero() {
                Duration::from_millis(1)
            } else {
                remaining
            };
            return RateDecision::Limited { retry_after };
        }

        entry.count += 1;
        RateDecision::Allowed
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
