//! Fixed-window rate limiter
//!
//! One global counter across all messages. The window resets lazily on the
//! first call that sees `now - window_start > window`; bursts at a window
//! boundary are accepted behavior.

use std::time::Duration;

use contracts::RateLimitConfig;
use tokio::time::Instant;

/// Fixed-window counter gating accepted dispatches
#[derive(Debug, Clone)]
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    count: u32,
    window_start: Instant,
}

impl RateLimiter {
    /// Create a limiter whose first window starts at `now`
    pub fn new(config: RateLimitConfig, now: Instant) -> Self {
        Self::with_window(config.limit, config.window(), now)
    }

    pub fn with_window(limit: u32, window: Duration, now: Instant) -> Self {
        Self {
            limit,
            window,
            count: 0,
            window_start: now,
        }
    }

    /// Take one unit of capacity
    ///
    /// Returns false, without side effects on the count, when the current
    /// window is full.
    pub fn try_acquire(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.window_start) > self.window {
            self.count = 0;
            self.window_start = now;
        }

        if self.count < self.limit {
            self.count += 1;
            true
        } else {
            false
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Units taken in the current window
    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn window_start(&self) -> Instant {
        self.window_start
    }

    /// Units left in the current window (as of the last acquire)
    pub fn remaining(&self) -> u32 {
        self.limit.saturating_sub(self.count)
    }
}
