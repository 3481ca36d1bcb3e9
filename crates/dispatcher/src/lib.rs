//! # Dispatcher
//!
//! Resilient email dispatch.
//!
//! Responsibilities:
//! - Skip ids that were already delivered
//! - Enforce the global fixed-window rate limit
//! - Rotate across providers with a shared retry budget
//! - Fan events out to handlers and queued sinks without blocking a dispatch

pub mod dedup;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod handle;
pub mod metrics;
pub mod rate_limiter;
pub mod rotator;
pub mod sinks;

pub use contracts::{DispatchEvent, DispatchOutcome, EmailMessage, EventSink};
pub use dedup::InMemoryDedupStore;
pub use dispatcher::{
    DispatcherBuilder, EmailDispatcher, create_dispatcher, create_dispatcher_with,
    create_sink_handle,
};
pub use error::{DispatchError, DispatcherError};
pub use events::EventBus;
pub use handle::SinkHandle;
pub use metrics::{
    DispatchSnapshot, DispatcherMetrics, KindSnapshot, SinkMetrics, SinkSnapshot,
};
pub use rate_limiter::RateLimiter;
pub use rotator::ProviderRotator;
pub use sinks::{FileSink, FileSinkConfig, LogSink};
