//! SimulatedProvider - random success per attempt
//!
//! Stands in for a remote API: each call succeeds with `success_rate`
//! probability and returns a random 9-character base-36 delivery id.

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, instrument};

use contracts::{DeliveryId, EmailMessage, EmailProvider, ProviderError};

use crate::error::{ProviderFactoryError, Result};

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const DELIVERY_ID_LEN: usize = 9;

/// Provider that succeeds at random
pub struct SimulatedProvider {
    name: String,
    success_rate: f64,
    rng: Mutex<StdRng>,
}

impl SimulatedProvider {
    /// Create a provider seeded from the OS
    pub fn new(name: impl Into<String>, success_rate: f64) -> Result<Self> {
        Self::with_rng(name.into(), success_rate, StdRng::from_os_rng())
    }

    /// Create a provider with a fixed seed (reproducible runs)
    pub fn with_seed(name: impl Into<String>, success_rate: f64, seed: u64) -> Result<Self> {
        Self::with_rng(name.into(), success_rate, StdRng::seed_from_u64(seed))
    }

    fn with_rng(name: String, success_rate: f64, rng: StdRng) -> Result<Self> {
        if !(0.0..=1.0).contains(&success_rate) {
            return Err(ProviderFactoryError::invalid_success_rate(name, success_rate));
        }

        Ok(Self {
            name,
            success_rate,
            rng: Mutex::new(rng),
        })
    }

    pub fn success_rate(&self) -> f64 {
        self.success_rate
    }

    fn roll(&self) -> std::result::Result<DeliveryId, ProviderError> {
        let mut rng = self.rng.lock();
        if !rng.random_bool(self.success_rate) {
            return Err(ProviderError::new("Failed to send email"));
        }

        let id: String = (0..DELIVERY_ID_LEN)
            .map(|_| BASE36[rng.random_range(0..BASE36.len())] as char)
            .collect();
        Ok(DeliveryId::new(id))
    }
}

#[async_trait]
impl EmailProvider for SimulatedProvider {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "simulated_provider_send",
        skip(self, message),
        fields(provider = %self.name, message_id = %message.id)
    )]
    async fn send(&self, message: &EmailMessage) -> std::result::Result<DeliveryId, ProviderError> {
        let result = self.roll();
        debug!(ok = result.is_ok(), "Simulated attempt");
        result
    }
}
