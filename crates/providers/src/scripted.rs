//! ScriptedProvider - deterministic provider with injectable failures
//!
//! Plays queued outcomes in order, then repeats a fallback outcome forever.
//! Counts every call so tests can assert how often a provider was tried.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::instrument;

use contracts::{DeliveryId, EmailMessage, EmailProvider, ProviderError};

/// One scripted outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptStep {
    /// Accept the message
    Succeed,
    /// Reject with this error message
    Fail(String),
}

/// Provider driven by a script of outcomes
pub struct ScriptedProvider {
    name: String,
    script: Mutex<VecDeque<ScriptStep>>,
    fallback: ScriptStep,
    calls: AtomicU32,
}

impl ScriptedProvider {
    /// Provider that repeats `fallback` once the script is exhausted
    pub fn new(name: impl Into<String>, fallback: ScriptStep) -> Self {
        Self {
            name: name.into(),
            script: Mutex::new(VecDeque::new()),
            fallback,
            calls: AtomicU32::new(0),
        }
    }

    /// Provider that accepts every message
    pub fn always_ok(name: impl Into<String>) -> Self {
        Self::new(name, ScriptStep::Succeed)
    }

    /// Provider that rejects every message
    pub fn always_fail(name: impl Into<String>) -> Self {
        Self::new(name, ScriptStep::Fail("Failed to send email".to_string()))
    }

    /// Queue a failure ahead of the fallback
    pub fn then_fail(self, error: impl Into<String>) -> Self {
        self.script.lock().push_back(ScriptStep::Fail(error.into()));
        self
    }

    /// Queue a success ahead of the fallback
    pub fn then_succeed(self) -> Self {
        self.script.lock().push_back(ScriptStep::Succeed);
        self
    }

    /// Number of `send` calls so far
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_step(&self) -> ScriptStep {
        self.script
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

#[async_trait]
impl EmailProvider for ScriptedProvider {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "scripted_provider_send",
        skip(self, message),
        fields(provider = %self.name, message_id = %message.id)
    )]
    async fn send(&self, message: &EmailMessage) -> Result<DeliveryId, ProviderError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;

        match self.next_step() {
            ScriptStep::Succeed => Ok(DeliveryId::new(format!("{}-{}", self.name, call))),
            ScriptStep::Fail(error) => Err(ProviderError::new(error)),
        }
    }
}
