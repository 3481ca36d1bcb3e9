//! Provider rotation
//!
//! The cursor is shared by every dispatch on a dispatcher: a failure while
//! sending one message also moves the starting provider for the next one.

use std::sync::Arc;

use contracts::EmailProvider;

use crate::error::DispatcherError;

/// Ordered, non-empty provider list with a wrapping cursor
pub struct ProviderRotator {
    providers: Vec<Arc<dyn EmailProvider>>,
    index: usize,
}

impl ProviderRotator {
    /// # Errors
    /// `NoProviders` if the list is empty
    pub fn new(providers: Vec<Arc<dyn EmailProvider>>) -> Result<Self, DispatcherError> {
        if providers.is_empty() {
            return Err(DispatcherError::NoProviders);
        }
        Ok(Self {
            providers,
            index: 0,
        })
    }

    /// Provider under the cursor
    pub fn current(&self) -> &Arc<dyn EmailProvider> {
        &self.providers[self.index]
    }

    /// Move the cursor one step, wrapping at the end
    pub fn advance(&mut self) {
        self.index = (self.index + 1) % self.providers.len();
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }
}

impl std::fmt::Debug for ProviderRotator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRotator")
            .field("providers", &self.names())
            .field("index", &self.index)
            .finish()
    }
}
