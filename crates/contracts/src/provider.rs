//! EmailProvider trait - one outbound delivery channel
//!
//! Defines the abstract interface the dispatcher rotates across.

use async_trait::async_trait;
use thiserror::Error;

use crate::{DeliveryId, EmailMessage};

/// Single failed delivery attempt reported by a provider
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ProviderError {
    message: String,
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Outbound email provider
///
/// Implementations make exactly one attempt per `send` call; retry and
/// failover belong to the dispatcher. Any call may succeed or fail, including
/// repeatedly.
///
/// Object safe so the dispatcher can hold an ordered `Vec<Arc<dyn EmailProvider>>`
/// of heterogeneous providers.
#[async_trait]
pub trait EmailProvider: Send + Sync {
    /// Provider name (used in events, logs and metrics)
    fn name(&self) -> &str;

    /// Attempt delivery of one message
    ///
    /// # Errors
    /// Returns the provider's failure description
    async fn send(&self, message: &EmailMessage) -> Result<DeliveryId, ProviderError>;
}
