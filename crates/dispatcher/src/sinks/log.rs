//! LogSink - logs dispatch events via tracing

use contracts::{ContractError, DispatchEvent, EventSink};
use tracing::{info, instrument, warn};

/// Sink that logs every event
pub struct LogSink {
    name: String,
}

impl LogSink {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn log_event(&self, event: &DispatchEvent) {
        match event {
            DispatchEvent::Sent(e) => info!(
                sink = %self.name,
                message_id = %e.id,
                provider = %e.provider,
                delivery_id = %e.delivery_id,
                attempt = e.attempt,
                "emailSent"
            ),
            DispatchEvent::Error(e) => warn!(
                sink = %self.name,
                message_id = %e.id,
                provider = %e.provider,
                error = %e.error,
                attempt = e.attempt,
                "emailError"
            ),
        }
    }
}

impl EventSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_sink_handle",
        skip(self, event),
        fields(sink = %self.name, event = event.kind())
    )]
    async fn handle(&mut self, event: &DispatchEvent) -> Result<(), ContractError> {
        self.log_event(event);
        Ok(())
    }

    #[instrument(name = "log_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        // Nothing to flush for log sink
        Ok(())
    }

    #[instrument(name = "log_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        info!(sink = %self.name, "LogSink closed");
        Ok(())
    }
}
