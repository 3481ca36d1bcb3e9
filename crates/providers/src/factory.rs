//! ProviderFactory - builds the ordered provider list from configuration

use std::sync::Arc;

use contracts::{EmailProvider, ProviderConfig, ProviderKind};
use tracing::{debug, info, instrument};

use crate::error::{ProviderFactoryError, Result};
use crate::scripted::ScriptedProvider;
use crate::simulated::SimulatedProvider;

/// Provider factory
///
/// Order of the returned list follows configuration order; the dispatcher's
/// rotation starts at index 0.
#[derive(Debug, Clone, Default)]
pub struct ProviderFactory {
    /// Base seed for simulated providers (None = seed from OS)
    seed: Option<u64>,
}

impl ProviderFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed simulated providers deterministically
    ///
    /// Provider `i` receives `seed + i`, so two providers with the same
    /// success rate still roll independently.
    pub fn with_seed(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }

    /// Build all providers
    #[instrument(
        name = "provider_factory_build",
        skip(self, configs),
        fields(provider_count = configs.len(), seeded = self.seed.is_some())
    )]
    pub fn build(&self, configs: &[ProviderConfig]) -> Result<Vec<Arc<dyn EmailProvider>>> {
        if configs.is_empty() {
            return Err(ProviderFactoryError::NoProviders);
        }

        let providers = configs
            .iter()
            .enumerate()
            .map(|(index, config)| self.build_one(index, config))
            .collect::<Result<Vec<_>>>()?;

        info!(providers = providers.len(), "Providers built");
        Ok(providers)
    }

    fn build_one(&self, index: usize, config: &ProviderConfig) -> Result<Arc<dyn EmailProvider>> {
        debug!(provider = %config.name, kind = ?config.kind, "Building provider");

        let provider: Arc<dyn EmailProvider> = match config.kind {
            ProviderKind::Simulated => {
                let simulated = match self.seed {
                    Some(seed) => SimulatedProvider::with_seed(
                        &config.name,
                        config.success_rate,
                        seed.wrapping_add(index as u64),
                    )?,
                    None => SimulatedProvider::new(&config.name, config.success_rate)?,
                };
                Arc::new(simulated)
            }
            ProviderKind::AlwaysOk => Arc::new(ScriptedProvider::always_ok(&config.name)),
            ProviderKind::AlwaysFail => Arc::new(ScriptedProvider::always_fail(&config.name)),
        };

        Ok(provider)
    }
}
