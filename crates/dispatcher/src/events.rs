//! EventBus - fans dispatch events out to handlers and sinks
//!
//! Handlers run synchronously in registration order. Sinks are offered each
//! event through a non-blocking queue; a full queue drops the event.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use contracts::{DispatchEvent, ErrorEvent, ErrorHandler, SentEvent, SentHandler};

use crate::handle::SinkHandle;
use crate::metrics::{DispatcherMetrics, SinkSnapshot};

/// Event fan-out owned by a dispatcher
pub struct EventBus {
    sent_handlers: RwLock<Vec<SentHandler>>,
    error_handlers: RwLock<Vec<ErrorHandler>>,
    sinks: Vec<SinkHandle>,
    metrics: Arc<DispatcherMetrics>,
}

impl EventBus {
    pub fn new(sinks: Vec<SinkHandle>, metrics: Arc<DispatcherMetrics>) -> Self {
        Self {
            sent_handlers: RwLock::new(Vec::new()),
            error_handlers: RwLock::new(Vec::new()),
            sinks,
            metrics,
        }
    }

    /// Register a `sent` handler
    pub fn on_sent(&self, handler: SentHandler) {
        self.sent_handlers.write().push(handler);
    }

    /// Register an `error` handler
    pub fn on_error(&self, handler: ErrorHandler) {
        self.error_handlers.write().push(handler);
    }

    pub fn emit_sent(&self, event: SentEvent) {
        // Snapshot so a handler may register further handlers
        let handlers = self.sent_handlers.read().clone();
        for handler in &handlers {
            handler(&event);
        }
        self.publish(DispatchEvent::Sent(event));
    }

    pub fn emit_error(&self, event: ErrorEvent) {
        let handlers = self.error_handlers.read().clone();
        for handler in &handlers {
            handler(&event);
        }
        self.publish(DispatchEvent::Error(event));
    }

    fn publish(&self, event: DispatchEvent) {
        for sink in &self.sinks {
            if !sink.offer(event.clone()) {
                self.metrics.inc_events_dropped();
            }
        }
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Per-sink metrics snapshots
    pub fn sink_metrics(&self) -> Vec<(String, SinkSnapshot)> {
        self.sinks
            .iter()
            .map(|h| (h.name().to_string(), h.snapshot()))
            .collect()
    }

    /// Drain and close every sink
    pub async fn shutdown(self) {
        debug!(sinks = self.sinks.len(), "Shutting down event sinks");
        for sink in self.sinks {
            sink.shutdown().await;
        }
    }
}
