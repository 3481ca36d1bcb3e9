//! SinkHandle - one event sink fed through a bounded queue
//!
//! The dispatcher only ever offers events; a full queue drops the event and
//! counts it against its kind. The worker owns the sink until shutdown, then
//! flushes and closes it.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use contracts::{DispatchEvent, EventSink};

use crate::metrics::{SinkMetrics, SinkSnapshot};

pub struct SinkHandle {
    name: String,
    tx: mpsc::Sender<DispatchEvent>,
    metrics: Arc<SinkMetrics>,
    worker: JoinHandle<()>,
}

impl SinkHandle {
    /// Spawn the sink's worker; needs a tokio runtime
    pub fn spawn<S: EventSink + Send + 'static>(sink: S, queue_capacity: usize) -> Self {
        let name = sink.name().to_string();
        let (tx, rx) = mpsc::channel(queue_capacity.max(1));
        let metrics = Arc::new(SinkMetrics::new());
        let worker = tokio::spawn(drain(sink, rx, Arc::clone(&metrics)));

        Self {
            name,
            tx,
            metrics,
            worker,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Events waiting for the worker
    pub fn queued(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }

    pub fn snapshot(&self) -> SinkSnapshot {
        self.metrics.snapshot(self.queued())
    }

    /// Queue an event without waiting
    ///
    /// Returns false when the event was dropped.
    pub fn offer(&self, event: DispatchEvent) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(event)) => {
                self.metrics.record_dropped(&event);
                warn!(
                    sink = %self.name,
                    event = event.kind(),
                    message_id = %event.message_id(),
                    attempt = event.attempt(),
                    "Sink queue full, event dropped"
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(event)) => {
                self.metrics.record_dropped(&event);
                error!(sink = %self.name, event = event.kind(), "Sink worker is gone");
                false
            }
        }
    }

    /// Stop accepting events, then wait for the worker to drain and close
    pub async fn shutdown(self) {
        let Self {
            name, tx, worker, ..
        } = self;
        drop(tx);
        if let Err(e) = worker.await {
            error!(sink = %name, error = ?e, "Sink worker panicked");
        }
        debug!(sink = %name, "Sink closed");
    }
}

async fn drain<S: EventSink>(
    mut sink: S,
    mut rx: mpsc::Receiver<DispatchEvent>,
    metrics: Arc<SinkMetrics>,
) {
    while let Some(event) = rx.recv().await {
        match sink.handle(&event).await {
            Ok(()) => metrics.record_handled(&event),
            Err(e) => {
                metrics.record_failed(&event);
                error!(
                    sink = sink.name(),
                    event = event.kind(),
                    message_id = %event.message_id(),
                    provider = event.provider(),
                    error = %e,
                    "Sink failed to handle event"
                );
            }
        }
    }

    let flushed = sink.flush().await;
    let closed = sink.close().await;
    if let Err(e) = flushed.and(closed) {
        error!(sink = sink.name(), error = %e, "Sink flush/close failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{ContractError, ErrorEvent, SentEvent};
    use parking_lot::Mutex;
    use tokio::sync::Notify;

    /// Records event kinds; fails `error` events when asked to
    struct RecordingSink {
        seen: Arc<Mutex<Vec<&'static str>>>,
        reject_errors: bool,
        gate: Option<Arc<Notify>>,
        closed: Arc<Mutex<bool>>,
    }

    impl RecordingSink {
        fn new() -> Self {
            Self {
                seen: Arc::new(Mutex::new(Vec::new())),
                reject_errors: false,
                gate: None,
                closed: Arc::new(Mutex::new(false)),
            }
        }
    }

    impl EventSink for RecordingSink {
        fn name(&self) -> &str {
            "recording"
        }

        async fn handle(&mut self, event: &DispatchEvent) -> Result<(), ContractError> {
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            if self.reject_errors && matches!(event, DispatchEvent::Error(_)) {
                return Err(ContractError::sink_write("recording", "rejected"));
            }
            self.seen.lock().push(event.kind());
            Ok(())
        }

        async fn flush(&mut self) -> Result<(), ContractError> {
            Ok(())
        }

        async fn close(&mut self) -> Result<(), ContractError> {
            *self.closed.lock() = true;
            Ok(())
        }
    }

    fn sent(id: &str) -> DispatchEvent {
        DispatchEvent::Sent(SentEvent {
            id: id.into(),
            provider: "p".into(),
            delivery_id: "d".into(),
            attempt: 2,
        })
    }

    fn failed(id: &str) -> DispatchEvent {
        DispatchEvent::Error(ErrorEvent {
            id: id.into(),
            provider: "p".into(),
            error: "down".into(),
            attempt: 1,
        })
    }

    #[tokio::test]
    async fn test_events_handled_in_order_and_sink_closed() {
        let sink = RecordingSink::new();
        let seen = Arc::clone(&sink.seen);
        let closed = Arc::clone(&sink.closed);

        let handle = SinkHandle::spawn(sink, 10);
        assert!(handle.offer(failed("1")));
        assert!(handle.offer(sent("1")));
        let metrics = Arc::clone(&handle.metrics);
        handle.shutdown().await;

        assert_eq!(*seen.lock(), vec!["error", "sent"]);
        assert!(*closed.lock());

        let snapshot = metrics.snapshot(0);
        assert_eq!(snapshot.sent.handled, 1);
        assert_eq!(snapshot.error.handled, 1);
        assert_eq!(snapshot.handled(), 2);
    }

    #[tokio::test]
    async fn test_full_queue_drops_are_counted_per_kind() {
        let gate = Arc::new(Notify::new());
        let mut sink = RecordingSink::new();
        sink.gate = Some(Arc::clone(&gate));

        let handle = SinkHandle::spawn(sink, 1);
        // Worker has not run yet: only the first event fits
        assert!(handle.offer(failed("1")));
        assert!(!handle.offer(sent("1")));
        assert!(!handle.offer(failed("2")));
        assert!(!handle.offer(failed("3")));

        let snapshot = handle.snapshot();
        assert_eq!(snapshot.queued, 1);
        assert_eq!(snapshot.error.dropped, 2);
        assert_eq!(snapshot.sent.dropped, 1);
        assert_eq!(snapshot.dropped(), 3);

        gate.notify_one();
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_handle_failures_counted_per_kind() {
        let mut sink = RecordingSink::new();
        sink.reject_errors = true;
        let seen = Arc::clone(&sink.seen);

        let handle = SinkHandle::spawn(sink, 10);
        handle.offer(failed("1"));
        handle.offer(failed("2"));
        handle.offer(sent("2"));
        let metrics = Arc::clone(&handle.metrics);
        handle.shutdown().await;

        let snapshot = metrics.snapshot(0);
        assert_eq!(snapshot.error.failed, 2);
        assert_eq!(snapshot.sent.handled, 1);
        assert_eq!(snapshot.failed(), 2);
        assert_eq!(*seen.lock(), vec!["sent"]);
    }
}
