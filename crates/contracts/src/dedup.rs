//! DedupStore trait - record of already-dispatched message ids

use crate::MessageId;

/// Membership set of message ids that were successfully dispatched
///
/// Checked once at the start of a dispatch, before rate limiting, and written
/// only after a provider accepted the message. Entries are never removed.
pub trait DedupStore: Send {
    /// Whether `id` was already dispatched
    fn contains(&self, id: &str) -> bool;

    /// Record a successful dispatch
    fn mark_sent(&mut self, id: MessageId);

    /// Number of remembered ids
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
