//! # Integration Tests
//!
//! Cross-crate and end-to-end tests.
//!
//! Covers:
//! - Contract wire shapes
//! - Dispatch properties with scripted providers (dedup, rate limit, failover)
//! - Config file -> dispatcher -> sink end to end

#[cfg(test)]
mod contract_tests {
    use contracts::{
        DeliveryId, DispatchEvent, DispatchOutcome, EmailMessage, ErrorEvent, SentEvent,
    };

    #[test]
    fn test_event_wire_shape() {
        let event = DispatchEvent::Error(ErrorEvent {
            id: "1".into(),
            provider: "Provider1".into(),
            error: "Failed to send email".into(),
            attempt: 1,
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "error");
        assert_eq!(json["id"], "1");
        assert_eq!(json["provider"], "Provider1");
        assert_eq!(json["error"], "Failed to send email");

        let event = DispatchEvent::Sent(SentEvent {
            id: "1".into(),
            provider: "Provider2".into(),
            delivery_id: DeliveryId::new("k3j9x0a1b"),
            attempt: 2,
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "sent");
        assert_eq!(json["delivery_id"], "k3j9x0a1b");
    }

    #[test]
    fn test_outcome_wire_shape() {
        let json = serde_json::to_value(DispatchOutcome::AlreadySent { id: "7".into() }).unwrap();
        assert_eq!(json["status"], "already_sent");
        assert_eq!(json["id"], "7");
    }

    #[test]
    fn test_message_payload_optional() {
        let message: EmailMessage =
            serde_json::from_str(r#"{ "id": "1", "to": "a@example.com" }"#).unwrap();
        assert_eq!(message.id, "1");
        assert!(message.subject.is_empty());
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use contracts::{DispatchOutcome, EmailMessage, EmailProvider, ErrorEvent, SentEvent};
    use dispatcher::{DispatchError, DispatcherBuilder, EmailDispatcher, InMemoryDedupStore};
    use parking_lot::Mutex;
    use providers::ScriptedProvider;

    fn message(id: &str) -> EmailMessage {
        EmailMessage::new(id, "test@example.com", "Test", "Hello")
    }

    fn as_dyn(providers: &[Arc<ScriptedProvider>]) -> Vec<Arc<dyn EmailProvider>> {
        providers
            .iter()
            .map(|p| Arc::clone(p) as Arc<dyn EmailProvider>)
            .collect()
    }

    /// Collects every event a dispatcher emits
    #[derive(Default)]
    struct EventLog {
        sent: Mutex<Vec<SentEvent>>,
        errors: Mutex<Vec<ErrorEvent>>,
    }

    impl EventLog {
        fn attach(dispatcher: &EmailDispatcher) -> Arc<Self> {
            let log = Arc::new(Self::default());
            let sent = Arc::clone(&log);
            dispatcher.on_sent(move |e| sent.sent.lock().push(e.clone()));
            let errors = Arc::clone(&log);
            dispatcher.on_error(move |e| errors.errors.lock().push(e.clone()));
            log
        }

        fn counts(&self) -> (usize, usize) {
            (self.errors.lock().len(), self.sent.lock().len())
        }
    }

    /// Known ids never reach a provider and never consume rate capacity
    #[tokio::test]
    async fn test_known_ids_skip_providers_and_limiter() {
        let p = Arc::new(ScriptedProvider::always_ok("p"));
        let dispatcher = DispatcherBuilder::new(as_dyn(&[p.clone()]))
            .rate_limit(contracts::RateLimitConfig {
                limit: 1,
                window_secs: 60,
            })
            .dedup_store(InMemoryDedupStore::with_ids(["a", "b", "c"]))
            .build()
            .unwrap();

        for id in ["a", "b", "c", "a", "b", "c"] {
            let outcome = dispatcher.dispatch(&message(id)).await.unwrap();
            assert_eq!(outcome, DispatchOutcome::AlreadySent { id: id.into() });
        }
        assert_eq!(p.calls(), 0);

        // The single unit of capacity is still available
        assert!(dispatcher.dispatch(&message("d")).await.unwrap().is_sent());
    }

    /// limit=10: ten distinct messages go out, the eleventh is rejected
    /// until the window passes
    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_scenario() {
        let p = Arc::new(ScriptedProvider::always_ok("p"));
        let dispatcher = DispatcherBuilder::new(as_dyn(&[p.clone()]))
            .build()
            .unwrap();

        for i in 0..10 {
            let outcome = dispatcher.dispatch(&message(&format!("m{i}"))).await;
            assert!(outcome.unwrap().is_sent());
        }

        let err = dispatcher.dispatch(&message("m10")).await.unwrap_err();
        assert!(matches!(err, DispatchError::RateLimitExceeded { limit: 10, .. }));
        assert_eq!(p.calls(), 10);

        // Exactly at the window edge the old window still applies
        tokio::time::advance(Duration::from_secs(60)).await;
        assert!(dispatcher.dispatch(&message("m10")).await.is_err());

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(dispatcher.dispatch(&message("m10")).await.unwrap().is_sent());
    }

    /// A always fails, B always succeeds: sent after exactly two attempts
    #[tokio::test]
    async fn test_failover_scenario() {
        let a = Arc::new(ScriptedProvider::always_fail("A"));
        let b = Arc::new(ScriptedProvider::always_ok("B"));
        let dispatcher = DispatcherBuilder::new(as_dyn(&[a.clone(), b.clone()]))
            .max_retries(2)
            .build()
            .unwrap();
        let log = EventLog::attach(&dispatcher);

        let outcome = dispatcher.dispatch(&message("1")).await.unwrap();

        assert_eq!(outcome.delivery_id().map(|d| d.as_str()), Some("B-1"));
        assert_eq!((a.calls(), b.calls()), (1, 1));
        assert_eq!(log.counts(), (1, 1));
        assert_eq!(log.errors.lock()[0].provider, "A");
        assert_eq!(log.sent.lock()[0].provider, "B");
    }

    /// Single always-failing provider with max_retries=2
    #[tokio::test]
    async fn test_single_provider_exhaustion_scenario() {
        let p = Arc::new(ScriptedProvider::always_fail("only"));
        let dispatcher = DispatcherBuilder::new(as_dyn(&[p.clone()]))
            .max_retries(2)
            .build()
            .unwrap();
        let log = EventLog::attach(&dispatcher);

        let err = dispatcher.dispatch(&message("1")).await.unwrap_err();

        assert_eq!(
            err,
            DispatchError::AllRetriesExhausted {
                id: "1".into(),
                attempts: 2
            }
        );
        assert_eq!(log.counts(), (2, 0));
        assert_eq!(dispatcher.sent_count().await, 0);
    }

    /// Budget is max_retries x provider_count, one error event per attempt
    #[tokio::test]
    async fn test_exhaustion_emits_budget_errors() {
        for provider_count in 1..=3 {
            for max_retries in 1..=3u32 {
                let providers: Vec<Arc<ScriptedProvider>> = (0..provider_count)
                    .map(|i| Arc::new(ScriptedProvider::always_fail(format!("p{i}"))))
                    .collect();
                let dispatcher = DispatcherBuilder::new(as_dyn(&providers))
                    .max_retries(max_retries)
                    .build()
                    .unwrap();
                let log = EventLog::attach(&dispatcher);

                let err = dispatcher.dispatch(&message("1")).await.unwrap_err();

                let budget = max_retries as usize * provider_count;
                assert_eq!(err.kind(), "exhausted");
                assert_eq!(log.counts(), (budget, 0));
                let total_calls: u32 = providers.iter().map(|p| p.calls()).sum();
                assert_eq!(total_calls as usize, budget);
            }
        }
    }

    /// Failure on attempt k, success on k+1: one error, one sent
    #[tokio::test]
    async fn test_fail_then_recover() {
        for k in 1..=3 {
            let mut p = ScriptedProvider::always_ok("flaky");
            for _ in 0..k - 1 {
                p = p.then_succeed();
            }
            let p = Arc::new(p.then_fail("timeout"));

            // Earlier messages consume the queued successes
            let dispatcher = DispatcherBuilder::new(as_dyn(&[p.clone()]))
                .max_retries(2)
                .build()
                .unwrap();
            for i in 0..k - 1 {
                dispatcher.dispatch(&message(&format!("warmup{i}"))).await.unwrap();
            }

            let log = EventLog::attach(&dispatcher);
            let outcome = dispatcher.dispatch(&message("target")).await.unwrap();

            assert!(outcome.is_sent());
            assert_eq!(log.counts(), (1, 1));
            assert_eq!(log.errors.lock()[0].attempt, 1);
            assert_eq!(log.sent.lock()[0].attempt, 2);
        }
    }

    /// After n consecutive failures the cursor sits at n mod provider_count
    #[tokio::test]
    async fn test_rotation_is_monotonic() {
        const PROVIDERS: usize = 3;

        for failures in 0..=6usize {
            // Call k goes to provider k % 3; the first `failures` calls fail
            let providers: Vec<Arc<ScriptedProvider>> = (0..PROVIDERS)
                .map(|j| {
                    let fails = (0..failures).filter(|k| k % PROVIDERS == j).count();
                    let mut p = ScriptedProvider::always_ok(format!("p{j}"));
                    for _ in 0..fails {
                        p = p.then_fail("down");
                    }
                    Arc::new(p)
                })
                .collect();
            let dispatcher = DispatcherBuilder::new(as_dyn(&providers))
                .max_retries(2)
                .build()
                .unwrap();
            let log = EventLog::attach(&dispatcher);

            let _ = dispatcher.dispatch(&message("1")).await;

            assert_eq!(log.counts().0, failures);
            assert_eq!(
                dispatcher.current_provider_index().await,
                failures % PROVIDERS,
                "after {failures} failures"
            );
        }
    }

    /// Same id twice: second call is already_sent with no new provider call
    #[tokio::test]
    async fn test_duplicate_scenario() {
        let p = Arc::new(ScriptedProvider::always_ok("p"));
        let dispatcher = DispatcherBuilder::new(as_dyn(&[p.clone()]))
            .build()
            .unwrap();

        let first = dispatcher.dispatch(&message("1")).await.unwrap();
        let second = dispatcher.dispatch(&message("1")).await.unwrap();

        assert_eq!(first.status(), "sent");
        assert_eq!(second.status(), "already_sent");
        assert_eq!(p.calls(), 1);
    }

    /// Concurrent dispatches of one id are serialized: one delivery only
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_same_id() {
        let p = Arc::new(ScriptedProvider::always_ok("p"));
        let dispatcher = Arc::new(
            DispatcherBuilder::new(as_dyn(&[p.clone()]))
                .build()
                .unwrap(),
        );

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let dispatcher = Arc::clone(&dispatcher);
                tokio::spawn(async move { dispatcher.dispatch(&message("same")).await })
            })
            .collect();

        let mut statuses = Vec::new();
        for handle in handles {
            statuses.push(handle.await.unwrap().unwrap().status());
        }

        assert_eq!(statuses.iter().filter(|s| **s == "sent").count(), 1);
        assert_eq!(statuses.iter().filter(|s| **s == "already_sent").count(), 7);
        assert_eq!(p.calls(), 1);
    }

    /// Handlers feed the stats aggregator used for run summaries
    #[tokio::test]
    async fn test_stats_aggregator_from_handlers() {
        let a = Arc::new(ScriptedProvider::always_fail("A"));
        let b = Arc::new(ScriptedProvider::always_ok("B"));
        let dispatcher = DispatcherBuilder::new(as_dyn(&[a, b]))
            .build()
            .unwrap();

        let stats = Arc::new(Mutex::new(observability::DispatchStatsAggregator::new()));
        let on_sent = Arc::clone(&stats);
        dispatcher.on_sent(move |e| on_sent.lock().on_sent(e));
        let on_error = Arc::clone(&stats);
        dispatcher.on_error(move |e| on_error.lock().on_error(e));

        for id in ["1", "2", "1"] {
            let outcome = dispatcher.dispatch(&message(id)).await.unwrap();
            stats.lock().record(outcome.status(), 0);
        }

        let summary = stats.lock().summary();
        assert_eq!(summary.sent, 2);
        assert_eq!(summary.already_sent, 1);
        assert_eq!(summary.provider_errors.get("A"), Some(&1));
        assert_eq!(summary.provider_sent.get("B"), Some(&2));
    }
}

#[cfg(test)]
mod config_e2e_tests {
    use std::io::Write;

    use config_loader::ConfigLoader;
    use contracts::EmailMessage;
    use dispatcher::create_dispatcher;

    /// TOML config -> dispatcher -> file sink
    #[tokio::test]
    async fn test_config_to_file_sink() {
        let dir = tempfile::tempdir().unwrap();
        let events_path = dir.path().join("events.jsonl");
        let config_path = dir.path().join("relay.toml");

        let mut config = std::fs::File::create(&config_path).unwrap();
        write!(
            config,
            r#"
[dispatch]
max_retries = 2

[[providers]]
name = "down"
kind = "always_fail"

[[providers]]
name = "up"
kind = "always_ok"

[[sinks]]
name = "audit"
sink_type = "file"
params = {{ path = "{}" }}
"#,
            events_path.display()
        )
        .unwrap();
        drop(config);

        let blueprint = ConfigLoader::load_from_path(&config_path).unwrap();
        let dispatcher = create_dispatcher(&blueprint).await.unwrap();

        let outcome = dispatcher
            .dispatch(&EmailMessage::new("1", "a@example.com", "s", "b"))
            .await
            .unwrap();
        assert_eq!(outcome.status(), "sent");

        dispatcher.shutdown().await;

        let content = std::fs::read_to_string(&events_path).unwrap();
        let events: Vec<serde_json::Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0]["event"], "error");
        assert_eq!(events[0]["provider"], "down");
        assert_eq!(events[0]["attempt"], 1);
        assert_eq!(events[1]["event"], "sent");
        assert_eq!(events[1]["provider"], "up");
        assert_eq!(events[1]["attempt"], 2);
    }

    /// Invalid config never reaches dispatcher construction
    #[test]
    fn test_invalid_config_rejected() {
        let err = ConfigLoader::load_from_str(
            "[rate_limit]\nlimit = 0\n\n[[providers]]\nname = \"p\"",
            config_loader::ConfigFormat::Toml,
        )
        .unwrap_err();
        assert!(err.to_string().contains("rate_limit.limit"));
    }

    /// A retry budget past u32::MAX fails validation and construction alike
    #[tokio::test]
    async fn test_overflowing_retry_budget_rejected() {
        let mut blueprint = contracts::RelayBlueprint::default();
        blueprint.dispatch.max_retries = 3_000_000_000;
        assert_eq!(blueprint.max_attempts(), None);

        let err = ConfigLoader::validate(&blueprint).unwrap_err();
        assert!(err.to_string().contains("dispatch.max_retries"));

        assert!(matches!(
            create_dispatcher(&blueprint).await,
            Err(dispatcher::DispatcherError::RetryBudgetOverflow { providers: 2, .. })
        ));
    }

    /// Zero retries: the rate slot is taken, no provider is called
    #[tokio::test]
    async fn test_zero_retries_config() {
        let blueprint = ConfigLoader::load_from_str(
            "[dispatch]\nmax_retries = 0\n\n[[providers]]\nname = \"up\"\nkind = \"always_ok\"",
            config_loader::ConfigFormat::Toml,
        )
        .unwrap();
        let dispatcher = create_dispatcher(&blueprint).await.unwrap();

        let err = dispatcher
            .dispatch(&EmailMessage::new("1", "a@example.com", "s", "b"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            dispatcher::DispatchError::AllRetriesExhausted { attempts: 0, .. }
        ));
        assert_eq!(dispatcher.metrics().exhausted, 1);
        assert_eq!(dispatcher.sent_count().await, 0);
    }
}
