//! Dispatcher error types

use std::time::Duration;

use contracts::MessageId;
use thiserror::Error;

/// Caller-visible dispatch failure
///
/// Per-attempt provider failures never appear here; they are absorbed into
/// rotation and reported through `error` events.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// The rate window is full; no provider was contacted
    #[error("Rate limit exceeded: {limit} sends per {window:?}")]
    RateLimitExceeded { limit: u32, window: Duration },

    /// Every attempt in the retry budget failed
    #[error("Failed to send email '{id}' after all retries ({attempts} attempts)")]
    AllRetriesExhausted { id: MessageId, attempts: u32 },
}

impl DispatchError {
    /// Short kind label (`rate_limited` / `exhausted`)
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RateLimitExceeded { .. } => "rate_limited",
            Self::AllRetriesExhausted { .. } => "exhausted",
        }
    }
}

/// Dispatcher construction errors
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Empty provider list
    #[error("dispatcher requires at least one provider")]
    NoProviders,

    /// `max_retries * provider_count` does not fit the attempt counter
    #[error("retry budget overflows: {max_retries} retries x {providers} providers")]
    RetryBudgetOverflow { max_retries: u32, providers: usize },

    /// Sink creation error
    #[error("failed to create sink '{name}': {message}")]
    SinkCreation { name: String, message: String },

    /// Provider construction error
    #[error("provider error: {0}")]
    Provider(#[from] providers::ProviderFactoryError),
}

impl DispatcherError {
    /// Create a sink creation error
    pub fn sink_creation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkCreation {
            name: name.into(),
            message: message.into(),
        }
    }
}
