//! RelayBlueprint - Config Loader output
//!
//! Describes a complete relay: retry budget, rate limit, the ordered provider
//! list and event sinks.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete relay configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayBlueprint {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Retry settings
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Global throughput cap
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Providers in rotation order (non-empty)
    pub providers: Vec<ProviderConfig>,

    /// Event sinks
    #[serde(default)]
    pub sinks: Vec<SinkConfig>,
}

impl RelayBlueprint {
    /// Total attempts one dispatch call may make
    ///
    /// `None` when `max_retries * provider_count` overflows `u32`.
    pub fn max_attempts(&self) -> Option<u32> {
        u32::try_from(self.providers.len())
            .ok()
            .and_then(|n| self.dispatch.max_retries.checked_mul(n))
    }
}

impl Default for RelayBlueprint {
    /// Two simulated providers at 70% success, 2 retries, 10 sends per minute
    fn default() -> Self {
        Self {
            version: ConfigVersion::V1,
            dispatch: DispatchConfig::default(),
            rate_limit: RateLimitConfig::default(),
            providers: vec![
                ProviderConfig::simulated("Provider1", default_success_rate()),
                ProviderConfig::simulated("Provider2", default_success_rate()),
            ],
            sinks: Vec::new(),
        }
    }
}

/// Retry settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Retries per provider; the budget is `max_retries * provider_count`
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
        }
    }
}

fn default_max_retries() -> u32 {
    2
}

/// Fixed-window rate limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Accepted dispatches per window
    #[serde(default = "default_limit")]
    pub limit: u32,

    /// Window length in seconds
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            window_secs: default_window_secs(),
        }
    }
}

fn default_limit() -> u32 {
    10
}

fn default_window_secs() -> u64 {
    60
}

/// Provider definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Unique name, reported in events
    pub name: String,

    /// Provider implementation
    #[serde(default)]
    pub kind: ProviderKind,

    /// Probability of success per attempt (simulated only)
    #[serde(default = "default_success_rate")]
    pub success_rate: f64,
}

impl ProviderConfig {
    pub fn simulated(name: impl Into<String>, success_rate: f64) -> Self {
        Self {
            name: name.into(),
            kind: ProviderKind::Simulated,
            success_rate,
        }
    }

    pub fn with_kind(name: impl Into<String>, kind: ProviderKind) -> Self {
        Self {
            name: name.into(),
            kind,
            success_rate: default_success_rate(),
        }
    }
}

fn default_success_rate() -> f64 {
    0.7
}

/// Provider implementation kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Random outcome per attempt
    #[default]
    Simulated,
    /// Every attempt succeeds
    AlwaysOk,
    /// Every attempt fails
    AlwaysFail,
}

/// Event sink configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Sink name
    pub name: String,

    /// Sink type
    pub sink_type: SinkType,

    /// Queue capacity
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Type-specific parameters
    #[serde(default)]
    pub params: HashMap<String, String>,
}

fn default_queue_capacity() -> usize {
    100
}

/// Event sink type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// Log events through tracing
    Log,
    /// Append events as JSON lines
    File,
}
