//! Provider construction error types

use contracts::ContractError;
use thiserror::Error;

/// Error raised while building providers
#[derive(Debug, Error)]
pub enum ProviderFactoryError {
    /// Empty provider list
    #[error("at least one provider is required")]
    NoProviders,

    /// Success rate outside [0, 1]
    #[error("provider '{name}' has invalid success_rate {rate}, expected a value in [0, 1]")]
    InvalidSuccessRate { name: String, rate: f64 },

    /// Wrapped ContractError
    #[error(transparent)]
    Contract(#[from] ContractError),
}

impl ProviderFactoryError {
    pub fn invalid_success_rate(name: impl Into<String>, rate: f64) -> Self {
        Self::InvalidSuccessRate {
            name: name.into(),
            rate,
        }
    }
}

impl From<ProviderFactoryError> for ContractError {
    fn from(err: ProviderFactoryError) -> Self {
        match err {
            ProviderFactoryError::Contract(inner) => inner,
            ProviderFactoryError::InvalidSuccessRate { ref name, .. } => {
                ContractError::provider_setup(name.clone(), err.to_string())
            }
            ProviderFactoryError::NoProviders => ContractError::config_validation(
                "providers",
                "at least one provider is required",
            ),
        }
    }
}

/// Result alias
pub type Result<T> = std::result::Result<T, ProviderFactoryError>;
