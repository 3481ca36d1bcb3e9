//! In-process counters for the dispatcher and its sinks

use std::sync::atomic::{AtomicU64, Ordering};

use contracts::DispatchEvent;

/// Dispatch outcome counters
#[derive(Debug, Default)]
pub struct DispatcherMetrics {
    /// Total dispatch calls
    dispatched: AtomicU64,
    /// Dispatches accepted by a provider
    sent: AtomicU64,
    /// Dispatches short-circuited by dedup
    already_sent: AtomicU64,
    /// Dispatches rejected by the rate limiter
    rate_limited: AtomicU64,
    /// Dispatches that used up the retry budget
    exhausted: AtomicU64,
    /// Individual provider attempts that failed
    failed_attempts: AtomicU64,
    /// Events dropped because a sink queue was full
    events_dropped: AtomicU64,
}

impl DispatcherMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_dispatched(&self) {
        self.dispatched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_sent(&self) {
        self.sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_already_sent(&self) {
        self.already_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_rate_limited(&self) {
        self.rate_limited.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_exhausted(&self) {
        self.exhausted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_failed_attempts(&self) {
        self.failed_attempts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_events_dropped(&self) {
        self.events_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all counters
    pub fn snapshot(&self) -> DispatchSnapshot {
        DispatchSnapshot {
            dispatched: self.dispatched.load(Ordering::Relaxed),
            sent: self.sent.load(Ordering::Relaxed),
            already_sent: self.already_sent.load(Ordering::Relaxed),
            rate_limited: self.rate_limited.load(Ordering::Relaxed),
            exhausted: self.exhausted.load(Ordering::Relaxed),
            failed_attempts: self.failed_attempts.load(Ordering::Relaxed),
            events_dropped: self.events_dropped.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of dispatcher counters (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSnapshot {
    pub dispatched: u64,
    pub sent: u64,
    pub already_sent: u64,
    pub rate_limited: u64,
    pub exhausted: u64,
    pub failed_attempts: u64,
    pub events_dropped: u64,
}

/// Counters for one event kind on one sink
#[derive(Debug, Default)]
struct KindCounters {
    handled: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
}

impl KindCounters {
    fn snapshot(&self) -> KindSnapshot {
        KindSnapshot {
            handled: self.handled.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

/// Delivery counters for a single event sink, split by event kind
#[derive(Debug, Default)]
pub struct SinkMetrics {
    sent: KindCounters,
    error: KindCounters,
}

impl SinkMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    fn counters(&self, event: &DispatchEvent) -> &KindCounters {
        match event {
            DispatchEvent::Sent(_) => &self.sent,
            DispatchEvent::Error(_) => &self.error,
        }
    }

    pub fn record_handled(&self, event: &DispatchEvent) {
        self.counters(event).handled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed(&self, event: &DispatchEvent) {
        self.counters(event).failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped(&self, event: &DispatchEvent) {
        self.counters(event).dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot with the caller-observed queue depth
    pub fn snapshot(&self, queued: usize) -> SinkSnapshot {
        SinkSnapshot {
            queued,
            sent: self.sent.snapshot(),
            error: self.error.snapshot(),
        }
    }
}

/// Counters of one event kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KindSnapshot {
    pub handled: u64,
    pub failed: u64,
    pub dropped: u64,
}

/// Snapshot of sink metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkSnapshot {
    /// Events waiting in the queue
    pub queued: usize,
    pub sent: KindSnapshot,
    pub error: KindSnapshot,
}

impl SinkSnapshot {
    pub fn handled(&self) -> u64 {
        self.sent.handled + self.error.handled
    }

    pub fn failed(&self) -> u64 {
        self.sent.failed + self.error.failed
    }

    pub fn dropped(&self) -> u64 {
        self.sent.dropped + self.error.dropped
    }
}
