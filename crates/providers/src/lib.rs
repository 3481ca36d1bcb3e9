//! # Providers
//!
//! Outbound email provider implementations.
//!
//! Responsibilities:
//! - Build the ordered provider list from `ProviderConfig`s
//! - Simulated providers with a configurable success rate
//! - Scripted providers with injectable failure sequences (tests, demos)
//!
//! Real transports are out of scope; anything implementing
//! [`EmailProvider`] can be handed to the dispatcher directly.

pub mod error;
pub mod factory;
pub mod scripted;
pub mod simulated;

pub use contracts::{DeliveryId, EmailMessage, EmailProvider, ProviderError};
pub use error::{ProviderFactoryError, Result};
pub use factory::ProviderFactory;
pub use scripted::{ScriptStep, ScriptedProvider};
pub use simulated::SimulatedProvider;
