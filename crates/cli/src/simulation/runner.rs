//! Simulation runner - drives synthetic messages through a dispatcher.

use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use contracts::{EmailMessage, RelayBlueprint};
use dispatcher::{create_dispatcher_with, DispatchError, EmailDispatcher};
use observability::DispatchStatsAggregator;
use parking_lot::Mutex;
use providers::ProviderFactory;
use tracing::{debug, info, warn};

use super::SimulationStats;

/// Simulation configuration
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub blueprint: RelayBlueprint,

    /// Messages to dispatch
    pub count: u64,

    /// Re-send the previous id every K messages (None = never)
    pub duplicate_every: Option<u64>,

    /// Pause between messages
    pub interval: Option<Duration>,

    /// Seed for simulated providers
    pub seed: Option<u64>,
}

impl SimulationConfig {
    /// Message id for the i-th message
    fn message_id(&self, i: u64) -> String {
        match self.duplicate_every {
            Some(k) if k > 0 && i > 0 && i % k == 0 => format!("msg-{}", i - 1),
            _ => format!("msg-{i}"),
        }
    }

    fn message(&self, i: u64) -> EmailMessage {
        EmailMessage::new(
            self.message_id(i),
            format!("user{i}@example.com"),
            format!("Simulated message {i}"),
            "Hello from mailrelay",
        )
    }
}

/// Batch simulation
pub struct Simulation {
    config: SimulationConfig,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    /// Dispatch every message, stopping early if `shutdown` resolves
    ///
    /// Sinks are drained before returning in both cases.
    pub async fn run(self, shutdown: impl Future<Output = ()>) -> Result<SimulationStats> {
        let start = Instant::now();

        let factory = match self.config.seed {
            Some(seed) => ProviderFactory::with_seed(seed),
            None => ProviderFactory::new(),
        };
        let dispatcher = create_dispatcher_with(&self.config.blueprint, &factory)
            .await
            .context("Failed to create dispatcher")?;

        let aggregator = Arc::new(Mutex::new(DispatchStatsAggregator::new()));
        let last_attempt = Arc::new(AtomicU32::new(0));
        register_handlers(&dispatcher, &aggregator, &last_attempt);

        info!(
            count = self.config.count,
            providers = dispatcher.provider_count(),
            max_attempts = dispatcher.max_attempts(),
            "Simulation started"
        );

        tokio::pin!(shutdown);
        let mut messages = 0;

        for i in 0..self.config.count {
            let message = self.config.message(i);

            let result = tokio::select! {
                biased;
                _ = &mut shutdown => {
                    warn!(sent = messages, "Shutdown requested, stopping simulation");
                    break;
                }
                result = dispatcher.dispatch(&message) => result,
            };
            messages += 1;

            let (status, attempts) = match &result {
                Ok(outcome) if outcome.is_sent() => {
                    (outcome.status(), last_attempt.load(Ordering::Relaxed))
                }
                Ok(outcome) => (outcome.status(), 0),
                Err(e @ DispatchError::AllRetriesExhausted { attempts, .. }) => {
                    observability::record_attempts_per_dispatch(*attempts);
                    (e.kind(), *attempts)
                }
                Err(e) => (e.kind(), 0),
            };
            observability::record_dispatch_outcome(status);
            aggregator.lock().record(status, attempts);
            debug!(message_id = %message.id, status, attempts, "Message processed");

            if let Some(interval) = self.config.interval {
                tokio::time::sleep(interval).await;
            }
        }

        let counters = dispatcher.metrics();
        let sinks = dispatcher.sink_metrics();
        dispatcher.shutdown().await;

        let dispatch = aggregator.lock().clone();
        Ok(SimulationStats {
            messages,
            duration: start.elapsed(),
            dispatch,
            counters,
            sinks,
        })
    }
}

fn register_handlers(
    dispatcher: &EmailDispatcher,
    aggregator: &Arc<Mutex<DispatchStatsAggregator>>,
    last_attempt: &Arc<AtomicU32>,
) {
    dispatcher.on_sent(observability::record_sent_event);
    dispatcher.on_error(observability::record_error_event);

    let agg = Arc::clone(aggregator);
    let attempt = Arc::clone(last_attempt);
    dispatcher.on_sent(move |event| {
        attempt.store(event.attempt, Ordering::Relaxed);
        agg.lock().on_sent(event);
    });

    let agg = Arc::clone(aggregator);
    dispatcher.on_error(move |event| agg.lock().on_error(event));
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{ProviderConfig, ProviderKind, RateLimitConfig};

    fn config(providers: Vec<ProviderConfig>, count: u64) -> SimulationConfig {
        SimulationConfig {
            blueprint: RelayBlueprint {
                providers,
                rate_limit: RateLimitConfig {
                    limit: 1000,
                    window_secs: 60,
                },
                ..RelayBlueprint::default()
            },
            count,
            duplicate_every: None,
            interval: None,
            seed: Some(7),
        }
    }

    #[test]
    fn test_message_ids_with_duplicates() {
        let mut cfg = config(Vec::new(), 0);
        cfg.duplicate_every = Some(3);
        let ids: Vec<String> = (0..7).map(|i| cfg.message_id(i)).collect();
        assert_eq!(
            ids,
            ["msg-0", "msg-1", "msg-2", "msg-2", "msg-4", "msg-5", "msg-5"]
        );
    }

    #[tokio::test]
    async fn test_failover_simulation() {
        let cfg = config(
            vec![
                ProviderConfig::with_kind("down", ProviderKind::AlwaysFail),
                ProviderConfig::with_kind("up", ProviderKind::AlwaysOk),
            ],
            5,
        );

        let stats = Simulation::new(cfg)
            .run(std::future::pending())
            .await
            .unwrap();

        assert_eq!(stats.messages, 5);
        assert_eq!(stats.dispatch.sent, 5);
        // Only the first message hits "down"; the cursor then stays on "up"
        assert_eq!(stats.dispatch.provider_errors.get("down"), Some(&1));
        assert_eq!(stats.dispatch.provider_sent.get("up"), Some(&5));
        assert_eq!(stats.counters.failed_attempts, 1);
    }

    #[tokio::test]
    async fn test_duplicates_and_rate_limit() {
        let mut cfg = config(
            vec![ProviderConfig::with_kind("up", ProviderKind::AlwaysOk)],
            6,
        );
        cfg.duplicate_every = Some(2);
        cfg.blueprint.rate_limit.limit = 2;

        let stats = Simulation::new(cfg)
            .run(std::future::pending())
            .await
            .unwrap();

        // ids: 0, 1, 1(dup), 3(limited), 3(limited), 5(limited)
        assert_eq!(stats.dispatch.sent, 2);
        assert_eq!(stats.dispatch.already_sent, 1);
        assert_eq!(stats.dispatch.rate_limited, 3);
    }

    #[tokio::test]
    async fn test_shutdown_stops_early() {
        let cfg = config(
            vec![ProviderConfig::with_kind("up", ProviderKind::AlwaysOk)],
            100,
        );

        let stats = Simulation::new(cfg).run(async {}).await.unwrap();
        assert_eq!(stats.messages, 0);
    }
}
