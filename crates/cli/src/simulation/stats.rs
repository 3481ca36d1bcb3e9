//! Simulation statistics.

use std::time::Duration;

use dispatcher::{DispatchSnapshot, SinkSnapshot};
use observability::DispatchStatsAggregator;

/// Statistics from a simulation run
#[derive(Debug, Clone, Default)]
pub struct SimulationStats {
    /// Messages pushed through the dispatcher
    pub messages: u64,

    /// Wall-clock duration of the run
    pub duration: Duration,

    /// Outcome and per-provider statistics
    pub dispatch: DispatchStatsAggregator,

    /// Dispatcher counters at the end of the run
    pub counters: DispatchSnapshot,

    /// Per-sink counters at the end of the run
    pub sinks: Vec<(String, SinkSnapshot)>,
}

impl SimulationStats {
    /// Messages per second
    pub fn throughput(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.messages as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    Simulation Statistics                     ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Messages: {}", self.messages);
        println!("   ├─ Throughput: {:.2} msg/s", self.throughput());
        println!("   ├─ Failed attempts: {}", self.counters.failed_attempts);
        println!("   └─ Events dropped: {}", self.counters.events_dropped);

        println!("\n{}", self.dispatch.summary());

        if !self.sinks.is_empty() {
            println!("📤 Sinks");
            for (i, (name, snapshot)) in self.sinks.iter().enumerate() {
                let prefix = if i == self.sinks.len() - 1 { "└─" } else { "├─" };
                println!(
                    "   {} {}: sent handled={} dropped={}, error handled={} dropped={}, failed={}",
                    prefix,
                    name,
                    snapshot.sent.handled,
                    snapshot.sent.dropped,
                    snapshot.error.handled,
                    snapshot.error.dropped,
                    snapshot.failed()
                );
            }
            println!();
        }
    }
}
