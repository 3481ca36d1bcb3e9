//! Dispatch events and the EventSink output interface
//!
//! Events are fire-and-forget notifications; nothing a handler or sink does
//! feeds back into the dispatch decision.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{ContractError, DeliveryId, MessageId};

/// A provider accepted a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentEvent {
    pub id: MessageId,
    pub provider: String,
    pub delivery_id: DeliveryId,
    /// 1-based attempt number within the dispatch call
    pub attempt: u32,
}

/// A single provider attempt failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEvent {
    pub id: MessageId,
    pub provider: String,
    pub error: String,
    /// 1-based attempt number within the dispatch call
    pub attempt: u32,
}

/// Event emitted by the dispatcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DispatchEvent {
    Sent(SentEvent),
    Error(ErrorEvent),
}

impl DispatchEvent {
    pub fn message_id(&self) -> &MessageId {
        match self {
            Self::Sent(e) => &e.id,
            Self::Error(e) => &e.id,
        }
    }

    pub fn provider(&self) -> &str {
        match self {
            Self::Sent(e) => &e.provider,
            Self::Error(e) => &e.provider,
        }
    }

    /// 1-based attempt within the dispatch call
    pub fn attempt(&self) -> u32 {
        match self {
            Self::Sent(e) => e.attempt,
            Self::Error(e) => e.attempt,
        }
    }

    /// Event kind label (`sent` / `error`)
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Sent(_) => "sent",
            Self::Error(_) => "error",
        }
    }
}

/// Synchronous subscriber for `sent` events
pub type SentHandler = Arc<dyn Fn(&SentEvent) + Send + Sync>;

/// Synchronous subscriber for `error` events
pub type ErrorHandler = Arc<dyn Fn(&ErrorEvent) + Send + Sync>;

/// Asynchronous event consumer
///
/// Sinks run behind their own queue; a slow or failing sink never delays a
/// dispatch.
#[trait_variant::make(EventSink: Send)]
pub trait LocalEventSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Consume one event
    ///
    /// # Errors
    /// Returns write error (should include context)
    async fn handle(&mut self, event: &DispatchEvent) -> Result<(), ContractError>;

    /// Flush buffer (if any)
    async fn flush(&mut self) -> Result<(), ContractError>;

    /// Close sink
    async fn close(&mut self) -> Result<(), ContractError>;
}
