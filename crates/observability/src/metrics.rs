//! Dispatch metrics
//!
//! `metrics` facade recorders for dispatch events and outcomes, plus an
//! in-memory aggregator for end-of-run summaries.

use std::collections::BTreeMap;

use contracts::{ErrorEvent, SentEvent};
use metrics::{counter, histogram};

/// Record a successful provider attempt
///
/// Meant to be registered as a dispatcher `sent` handler.
///
/// # Example
///
/// ```ignore
/// dispatcher.on_sent(observability::metrics::record_sent_event);
/// dispatcher.on_error(observability::metrics::record_error_event);
/// ```
pub fn record_sent_event(event: &SentEvent) {
    counter!(
        "mailrelay_provider_attempts_total",
        "provider" => event.provider.clone(),
        "result" => "success"
    )
    .increment(1);
    histogram!("mailrelay_attempts_per_dispatch").record(f64::from(event.attempt));
}

/// Record a failed provider attempt
pub fn record_error_event(event: &ErrorEvent) {
    counter!(
        "mailrelay_provider_attempts_total",
        "provider" => event.provider.clone(),
        "result" => "failure"
    )
    .increment(1);
}

/// Record the terminal status of one dispatch call
/// (`sent`, `already_sent`, `rate_limited`, `exhausted`)
pub fn record_dispatch_outcome(status: &'static str) {
    counter!("mailrelay_dispatch_total", "status" => status).increment(1);
}

/// Record the number of attempts a dispatch call made
///
/// `sent` handlers already record this; use it for calls that ended without
/// a `sent` event.
pub fn record_attempts_per_dispatch(attempts: u32) {
    histogram!("mailrelay_attempts_per_dispatch").record(f64::from(attempts));
}

/// Dispatch statistics aggregator
///
/// Aggregates in memory for summary output.
#[derive(Debug, Clone, Default)]
pub struct DispatchStatsAggregator {
    /// Dispatch calls seen
    pub total_dispatches: u64,

    pub sent: u64,
    pub already_sent: u64,
    pub rate_limited: u64,
    pub exhausted: u64,

    /// Attempts per call that reached a provider
    pub attempt_stats: RunningStats,

    /// Per-provider successful attempts
    pub provider_sent: BTreeMap<String, u64>,

    /// Per-provider failed attempts
    pub provider_errors: BTreeMap<String, u64>,
}

impl DispatchStatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_sent(&mut self, event: &SentEvent) {
        *self.provider_sent.entry(event.provider.clone()).or_insert(0) += 1;
    }

    pub fn on_error(&mut self, event: &ErrorEvent) {
        *self
            .provider_errors
            .entry(event.provider.clone())
            .or_insert(0) += 1;
    }

    /// Count one finished dispatch call
    ///
    /// `attempts` is 0 for calls that never reached a provider.
    pub fn record(&mut self, status: &str, attempts: u32) {
        self.total_dispatches += 1;
        match status {
            "sent" => self.sent += 1,
            "already_sent" => self.already_sent += 1,
            "rate_limited" => self.rate_limited += 1,
            "exhausted" => self.exhausted += 1,
            _ => {}
        }
        if attempts > 0 {
            self.attempt_stats.push(f64::from(attempts));
        }
    }

    pub fn summary(&self) -> DispatchSummary {
        let attempted = self.sent + self.exhausted;
        DispatchSummary {
            total_dispatches: self.total_dispatches,
            sent: self.sent,
            already_sent: self.already_sent,
            rate_limited: self.rate_limited,
            exhausted: self.exhausted,
            success_rate: if attempted > 0 {
                self.sent as f64 / attempted as f64 * 100.0
            } else {
                0.0
            },
            attempts: StatsSummary::from(&self.attempt_stats),
            provider_sent: self.provider_sent.clone(),
            provider_errors: self.provider_errors.clone(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Summary of a dispatch run
#[derive(Debug, Clone, Default)]
pub struct DispatchSummary {
    pub total_dispatches: u64,
    pub sent: u64,
    pub already_sent: u64,
    pub rate_limited: u64,
    pub exhausted: u64,
    /// Sent / (sent + exhausted), percent
    pub success_rate: f64,
    pub attempts: StatsSummary,
    pub provider_sent: BTreeMap<String, u64>,
    pub provider_errors: BTreeMap<String, u64>,
}

impl std::fmt::Display for DispatchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Dispatch Summary ===")?;
        writeln!(f, "Total dispatches: {}", self.total_dispatches)?;
        writeln!(f, "Sent: {} ({:.2}%)", self.sent, self.success_rate)?;
        writeln!(f, "Already sent: {}", self.already_sent)?;
        writeln!(f, "Rate limited: {}", self.rate_limited)?;
        writeln!(f, "Exhausted: {}", self.exhausted)?;
        writeln!(f, "Attempts per dispatch: {}", self.attempts)?;

        if !self.provider_sent.is_empty() || !self.provider_errors.is_empty() {
            writeln!(f, "Providers:")?;
            let mut names: Vec<&String> = self
                .provider_sent
                .keys()
                .chain(self.provider_errors.keys())
                .collect();
            names.sort();
            names.dedup();
            for name in names {
                writeln!(
                    f,
                    "  {}: sent={}, failed={}",
                    name,
                    self.provider_sent.get(name).copied().unwrap_or(0),
                    self.provider_errors.get(name).copied().unwrap_or(0)
                )?;
            }
        }

        Ok(())
    }
}

/// Statistics summary
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.0}, max={:.0}, mean={:.2}, std={:.2} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            self.m2 += delta * (value - self.mean);
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 { 0.0 } else { self.mean }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
