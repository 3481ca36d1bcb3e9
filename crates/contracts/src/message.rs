//! EmailMessage and DeliveryId - per-call transient data

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::MessageId;

/// Outbound email submitted for dispatch
///
/// The payload is opaque to the dispatcher; only `id` drives dedup and logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    /// Caller-unique identifier
    pub id: MessageId,

    /// Recipient address
    pub to: String,

    /// Subject line
    #[serde(default)]
    pub subject: String,

    /// Message body
    #[serde(default)]
    pub body: String,
}

impl EmailMessage {
    /// Create a message
    pub fn new(
        id: impl Into<MessageId>,
        to: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
        }
    }
}

/// Identifier assigned by a provider to an accepted message
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeliveryId(String);

impl DeliveryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeliveryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeliveryId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for DeliveryId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_from_json_defaults() {
        let json = r#"{ "id": "1", "to": "test@example.com" }"#;
        let msg: EmailMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg.id, "1");
        assert_eq!(msg.to, "test@example.com");
        assert!(msg.subject.is_empty());
        assert!(msg.body.is_empty());
    }

    #[test]
    fn test_delivery_id_is_transparent() {
        let id = DeliveryId::new("k3j9x0a1b");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"k3j9x0a1b\"");
        assert_eq!(id.to_string(), "k3j9x0a1b");
    }
}
