//! DispatchOutcome - terminal result of a successful dispatch call

use serde::{Deserialize, Serialize};

use crate::{DeliveryId, MessageId};

/// Non-failure result of `dispatch`
///
/// Rate limiting and retry exhaustion are reported as errors by the
/// dispatcher; callers must match on the variant, since `AlreadySent`
/// carries no fresh delivery id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// A provider accepted the message
    Sent {
        delivery_id: DeliveryId,
        provider: String,
    },
    /// The id was dispatched before; nothing was sent
    AlreadySent { id: MessageId },
}

impl DispatchOutcome {
    /// Status label (`sent` / `already_sent`)
    pub fn status(&self) -> &'static str {
        match self {
            Self::Sent { .. } => "sent",
            Self::AlreadySent { .. } => "already_sent",
        }
    }

    pub fn delivery_id(&self) -> Option<&DeliveryId> {
        match self {
            Self::Sent { delivery_id, .. } => Some(delivery_id),
            Self::AlreadySent { .. } => None,
        }
    }

    pub fn is_sent(&self) -> bool {
        matches!(self, Self::Sent { .. })
    }
}
