//! # Contracts
//!
//! Frozen interface contracts shared by every mail relay crate: messages,
//! provider and dedup-store capabilities, dispatch events and outcomes, and
//! the configuration blueprint.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Rate windows are measured on the tokio monotonic clock
//! - Event timestamps (where recorded) are wall-clock UTC and added by sinks

mod blueprint;
mod dedup;
mod error;
mod event;
mod message;
mod message_id;
mod outcome;
mod provider;

pub use blueprint::*;
pub use dedup::DedupStore;
pub use error::*;
pub use event::*;
pub use message::{DeliveryId, EmailMessage};
pub use message_id::MessageId;
pub use outcome::DispatchOutcome;
pub use provider::{EmailProvider, ProviderError};
