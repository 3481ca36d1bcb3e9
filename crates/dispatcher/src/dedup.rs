//! In-memory dedup store
//!
//! Remembers every successfully dispatched id for the lifetime of the
//! process. There is no eviction, so memory grows with the number of
//! distinct ids sent.

use std::collections::HashSet;

use contracts::{DedupStore, MessageId};

/// Default `DedupStore`: an unbounded `HashSet`
#[derive(Debug, Default, Clone)]
pub struct InMemoryDedupStore {
    sent: HashSet<MessageId>,
}

impl InMemoryDedupStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with ids already sent elsewhere
    pub fn with_ids<I, T>(ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<MessageId>,
    {
        Self {
            sent: ids.into_iter().map(Into::into).collect(),
        }
    }
}

impl DedupStore for InMemoryDedupStore {
    fn contains(&self, id: &str) -> bool {
        self.sent.contains(id)
    }

    fn mark_sent(&mut self, id: MessageId) {
        self.sent.insert(id);
    }

    fn len(&self) -> usize {
        self.sent.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_and_contains() {
        let mut store = InMemoryDedupStore::new();
        assert!(store.is_empty());
        assert!(!store.contains("1"));

        store.mark_sent("1".into());
        store.mark_sent("1".into());

        assert!(store.contains("1"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_with_ids() {
        let store = InMemoryDedupStore::with_ids(["a", "b"]);
        assert!(store.contains("a"));
        assert!(store.contains("b"));
        assert!(!store.contains("c"));
    }
}
