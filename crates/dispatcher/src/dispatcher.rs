//! EmailDispatcher - dedup, rate limit, and the rotating retry loop

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use contracts::{
    DedupStore, DispatchOutcome, EmailMessage, EmailProvider, ErrorEvent, EventSink,
    RateLimitConfig, RelayBlueprint, SentEvent, SinkConfig, SinkType,
};
use providers::ProviderFactory;

use crate::dedup::InMemoryDedupStore;
use crate::error::{DispatchError, DispatcherError};
use crate::events::EventBus;
use crate::handle::SinkHandle;
use crate::metrics::{DispatchSnapshot, DispatcherMetrics, SinkSnapshot};
use crate::rate_limiter::RateLimiter;
use crate::rotator::ProviderRotator;
use crate::sinks::{FileSink, LogSink};

/// Mutable state shared by every dispatch call on one dispatcher
struct DispatchState {
    rotator: ProviderRotator,
    limiter: RateLimiter,
    dedup: Box<dyn DedupStore>,
}

/// Builder for creating an EmailDispatcher
pub struct DispatcherBuilder {
    providers: Vec<Arc<dyn EmailProvider>>,
    max_retries: u32,
    rate_limit: RateLimitConfig,
    dedup: Option<Box<dyn DedupStore>>,
    sinks: Vec<SinkHandle>,
    sent_handlers: Vec<contracts::SentHandler>,
    error_handlers: Vec<contracts::ErrorHandler>,
}

impl DispatcherBuilder {
    /// Start from an ordered provider list with default retry and rate settings
    pub fn new(providers: Vec<Arc<dyn EmailProvider>>) -> Self {
        Self {
            providers,
            max_retries: contracts::DispatchConfig::default().max_retries,
            rate_limit: RateLimitConfig::default(),
            dedup: None,
            sinks: Vec::new(),
            sent_handlers: Vec::new(),
            error_handlers: Vec::new(),
        }
    }

    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn rate_limit(mut self, rate_limit: RateLimitConfig) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    /// Replace the default in-memory dedup store
    pub fn dedup_store(mut self, store: impl DedupStore + 'static) -> Self {
        self.dedup = Some(Box::new(store));
        self
    }

    /// Attach a sink; spawns its worker, so this needs a tokio runtime
    pub fn sink<S: EventSink + Send + 'static>(mut self, sink: S, queue_capacity: usize) -> Self {
        self.sinks.push(SinkHandle::spawn(sink, queue_capacity));
        self
    }

    pub fn sink_handle(mut self, handle: SinkHandle) -> Self {
        self.sinks.push(handle);
        self
    }

    pub fn on_sent(mut self, handler: impl Fn(&SentEvent) + Send + Sync + 'static) -> Self {
        self.sent_handlers.push(Arc::new(handler));
        self
    }

    pub fn on_error(mut self, handler: impl Fn(&ErrorEvent) + Send + Sync + 'static) -> Self {
        self.error_handlers.push(Arc::new(handler));
        self
    }

    /// # Errors
    /// `NoProviders` for an empty provider list, `RetryBudgetOverflow` when
    /// `max_retries * provider_count` does not fit in a `u32`
    #[instrument(
        name = "dispatcher_builder_build",
        skip(self),
        fields(providers = self.providers.len(), max_retries = self.max_retries)
    )]
    pub fn build(self) -> Result<EmailDispatcher, DispatcherError> {
        let rotator = ProviderRotator::new(self.providers)?;
        let provider_count = rotator.len();
        let max_attempts = retry_budget(self.max_retries, provider_count).ok_or(
            DispatcherError::RetryBudgetOverflow {
                max_retries: self.max_retries,
                providers: provider_count,
            },
        )?;
        let limiter = RateLimiter::new(self.rate_limit, Instant::now());
        let dedup = self
            .dedup
            .unwrap_or_else(|| Box::new(InMemoryDedupStore::new()));

        let metrics = Arc::new(DispatcherMetrics::new());
        let events = EventBus::new(self.sinks, Arc::clone(&metrics));
        for handler in self.sent_handlers {
            events.on_sent(handler);
        }
        for handler in self.error_handlers {
            events.on_error(handler);
        }

        info!(
            providers = ?rotator.names(),
            max_attempts,
            limit = limiter.limit(),
            window_secs = limiter.window().as_secs(),
            sinks = events.sink_count(),
            "Dispatcher ready"
        );

        Ok(EmailDispatcher {
            state: Mutex::new(DispatchState {
                rotator,
                limiter,
                dedup,
            }),
            max_retries: self.max_retries,
            max_attempts,
            provider_count,
            events,
            metrics,
        })
    }
}

/// Resilient dispatcher in front of an ordered set of providers
///
/// Dispatch calls on one instance are serialized: the state lock is held for
/// the whole call, provider awaits included.
pub struct EmailDispatcher {
    state: Mutex<DispatchState>,
    max_retries: u32,
    max_attempts: u32,
    provider_count: usize,
    events: EventBus,
    metrics: Arc<DispatcherMetrics>,
}

impl EmailDispatcher {
    pub fn builder(providers: Vec<Arc<dyn EmailProvider>>) -> DispatcherBuilder {
        DispatcherBuilder::new(providers)
    }

    /// Send one message
    ///
    /// Returns `AlreadySent` without touching the rate limiter or any
    /// provider when the id was delivered before. Otherwise takes one unit of
    /// rate capacity and tries providers in rotation, advancing the shared
    /// cursor after every failure, until one accepts or the budget of
    /// `max_retries * provider_count` attempts runs out.
    #[instrument(
        name = "dispatcher_dispatch",
        skip(self, message),
        fields(message_id = %message.id)
    )]
    pub async fn dispatch(&self, message: &EmailMessage) -> Result<DispatchOutcome, DispatchError> {
        self.metrics.inc_dispatched();
        let mut state = self.state.lock().await;

        if state.dedup.contains(message.id.as_str()) {
            self.metrics.inc_already_sent();
            debug!("Message already sent, skipping");
            return Ok(DispatchOutcome::AlreadySent {
                id: message.id.clone(),
            });
        }

        if !state.limiter.try_acquire(Instant::now()) {
            self.metrics.inc_rate_limited();
            warn!(limit = state.limiter.limit(), "Rate limit exceeded");
            return Err(DispatchError::RateLimitExceeded {
                limit: state.limiter.limit(),
                window: state.limiter.window(),
            });
        }
        debug!(remaining = state.limiter.remaining(), "Rate capacity taken");

        let max_attempts = self.max_attempts;
        let mut attempts = 0;

        while attempts < max_attempts {
            let provider = Arc::clone(state.rotator.current());
            let attempt = attempts + 1;

            match provider.send(message).await {
                Ok(delivery_id) => {
                    state.dedup.mark_sent(message.id.clone());
                    self.metrics.inc_sent();
                    info!(
                        provider = provider.name(),
                        delivery_id = %delivery_id,
                        attempt,
                        "Email sent"
                    );
                    self.events.emit_sent(SentEvent {
                        id: message.id.clone(),
                        provider: provider.name().to_string(),
                        delivery_id: delivery_id.clone(),
                        attempt,
                    });
                    return Ok(DispatchOutcome::Sent {
                        delivery_id,
                        provider: provider.name().to_string(),
                    });
                }
                Err(e) => {
                    attempts += 1;
                    self.metrics.inc_failed_attempts();
                    warn!(
                        provider = provider.name(),
                        error = %e,
                        attempt,
                        max_attempts,
                        "Provider attempt failed"
                    );
                    self.events.emit_error(ErrorEvent {
                        id: message.id.clone(),
                        provider: provider.name().to_string(),
                        error: e.to_string(),
                        attempt,
                    });
                    state.rotator.advance();
                }
            }
        }

        self.metrics.inc_exhausted();
        warn!(attempts, "All retries exhausted");
        Err(DispatchError::AllRetriesExhausted {
            id: message.id.clone(),
            attempts,
        })
    }

    /// Register a `sent` handler; handlers run in registration order
    pub fn on_sent(&self, handler: impl Fn(&SentEvent) + Send + Sync + 'static) {
        self.events.on_sent(Arc::new(handler));
    }

    /// Register an `error` handler; handlers run in registration order
    pub fn on_error(&self, handler: impl Fn(&ErrorEvent) + Send + Sync + 'static) {
        self.events.on_error(Arc::new(handler));
    }

    /// Rotation cursor (waits for any in-flight dispatch)
    pub async fn current_provider_index(&self) -> usize {
        self.state.lock().await.rotator.index()
    }

    pub fn provider_count(&self) -> usize {
        self.provider_count
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Retry budget for one dispatch call
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Number of distinct ids delivered so far
    pub async fn sent_count(&self) -> usize {
        self.state.lock().await.dedup.len()
    }

    pub async fn is_sent(&self, id: &str) -> bool {
        self.state.lock().await.dedup.contains(id)
    }

    pub fn metrics(&self) -> DispatchSnapshot {
        self.metrics.snapshot()
    }

    pub fn sink_metrics(&self) -> Vec<(String, SinkSnapshot)> {
        self.events.sink_metrics()
    }

    /// Drain and close all sinks
    #[instrument(name = "dispatcher_shutdown", skip(self))]
    pub async fn shutdown(self) {
        let snapshot = self.metrics.snapshot();
        self.events.shutdown().await;
        info!(
            dispatched = snapshot.dispatched,
            sent = snapshot.sent,
            already_sent = snapshot.already_sent,
            rate_limited = snapshot.rate_limited,
            exhausted = snapshot.exhausted,
            "Dispatcher shutdown complete"
        );
    }
}

fn retry_budget(max_retries: u32, provider_count: usize) -> Option<u32> {
    u32::try_from(provider_count)
        .ok()
        .and_then(|n| max_retries.checked_mul(n))
}

/// Create a SinkHandle from configuration
#[instrument(
    name = "dispatcher_create_sink_handle",
    skip(config),
    fields(sink = %config.name, sink_type = ?config.sink_type)
)]
pub fn create_sink_handle(config: &SinkConfig) -> Result<SinkHandle, DispatcherError> {
    match config.sink_type {
        SinkType::Log => {
            let sink = LogSink::new(&config.name);
            Ok(SinkHandle::spawn(sink, config.queue_capacity))
        }
        SinkType::File => {
            let sink = FileSink::from_params(&config.name, &config.params)
                .map_err(|e| DispatcherError::sink_creation(&config.name, e.to_string()))?;
            Ok(SinkHandle::spawn(sink, config.queue_capacity))
        }
    }
}

/// Build a dispatcher, its providers and sinks from a blueprint
#[instrument(name = "dispatcher_create", skip(blueprint))]
pub async fn create_dispatcher(blueprint: &RelayBlueprint) -> Result<EmailDispatcher, DispatcherError> {
    create_dispatcher_with(blueprint, &ProviderFactory::new()).await
}

/// Same as [`create_dispatcher`] with a caller-supplied provider factory
/// (e.g. seeded for reproducible runs)
#[instrument(name = "dispatcher_create_with", skip(blueprint, factory))]
pub async fn create_dispatcher_with(
    blueprint: &RelayBlueprint,
    factory: &ProviderFactory,
) -> Result<EmailDispatcher, DispatcherError> {
    let providers = factory.build(&blueprint.providers)?;

    let mut builder = DispatcherBuilder::new(providers)
        .max_retries(blueprint.dispatch.max_retries)
        .rate_limit(blueprint.rate_limit);

    for sink_config in &blueprint.sinks {
        builder = builder.sink_handle(create_sink_handle(sink_config)?);
    }

    builder.build()
}
