//! MessageId - the dedup key carried by messages, outcomes and events

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Caller-supplied message identifier
///
/// The only part of a message the dispatcher inspects. One allocation is
/// shared by the message, the dedup store and every event for it.
///
/// ```
/// use contracts::MessageId;
///
/// let id = MessageId::from("welcome-42");
/// assert_eq!(id, "welcome-42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct MessageId(Arc<str>);

impl MessageId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// HashSet<MessageId> lookups by &str; Arc<str> hashes like str
impl Borrow<str> for MessageId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MessageId {
    fn from(s: &str) -> Self {
        Self(s.into())
    }
}

impl From<String> for MessageId {
    fn from(s: String) -> Self {
        Self(s.into())
    }
}

impl From<MessageId> for String {
    fn from(id: MessageId) -> Self {
        id.0.to_string()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<&str> for MessageId {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl PartialEq<str> for MessageId {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}
