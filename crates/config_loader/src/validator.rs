//! Config validation
//!
//! Rules:
//! - at least one provider, names non-empty and unique
//! - success_rate within [0, 1]
//! - max_retries x provider count fits the attempt counter
//! - limit, window_secs > 0
//! - sink names non-empty and unique, queue_capacity > 0
//! - file sinks carry a `path` param

use std::collections::HashSet;

use contracts::{ContractError, RelayBlueprint, SinkType};

/// Validate a RelayBlueprint
///
/// Returns the first error encountered.
pub fn validate(blueprint: &RelayBlueprint) -> Result<(), ContractError> {
    validate_providers(blueprint)?;
    validate_dispatch(blueprint)?;
    validate_rate_limit(blueprint)?;
    validate_sinks(blueprint)?;
    Ok(())
}

fn validate_providers(blueprint: &RelayBlueprint) -> Result<(), ContractError> {
    if blueprint.providers.is_empty() {
        return Err(ContractError::config_validation(
            "providers",
            "at least one provider is required",
        ));
    }

    let mut seen = HashSet::new();
    for (idx, provider) in blueprint.providers.iter().enumerate() {
        if provider.name.trim().is_empty() {
            return Err(ContractError::config_validation(
                format!("providers[{idx}].name"),
                "provider name cannot be empty",
            ));
        }
        if !seen.insert(provider.name.as_str()) {
            return Err(ContractError::config_validation(
                format!("providers[name={}]", provider.name),
                "duplicate provider name",
            ));
        }
        if !(0.0..=1.0).contains(&provider.success_rate) {
            return Err(ContractError::config_validation(
                format!("providers[{}].success_rate", provider.name),
                format!(
                    "success_rate must be within [0, 1], got {}",
                    provider.success_rate
                ),
            ));
        }
    }
    Ok(())
}

fn validate_dispatch(blueprint: &RelayBlueprint) -> Result<(), ContractError> {
    if blueprint.max_attempts().is_none() {
        return Err(ContractError::config_validation(
            "dispatch.max_retries",
            format!(
                "retry budget overflows: {} retries x {} providers",
                blueprint.dispatch.max_retries,
                blueprint.providers.len()
            ),
        ));
    }
    Ok(())
}

fn validate_rate_limit(blueprint: &RelayBlueprint) -> Result<(), ContractError> {
    let rate = &blueprint.rate_limit;
    if rate.limit == 0 {
        return Err(ContractError::config_validation(
            "rate_limit.limit",
            "limit must be >= 1",
        ));
    }
    if rate.window_secs == 0 {
        return Err(ContractError::config_validation(
            "rate_limit.window_secs",
            "window_secs must be > 0",
        ));
    }
    Ok(())
}

fn validate_sinks(blueprint: &RelayBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, sink) in blueprint.sinks.iter().enumerate() {
        if sink.name.is_empty() {
            return Err(ContractError::config_validation(
                format!("sinks[{idx}].name"),
                "sink name cannot be empty",
            ));
        }
        if !seen.insert(sink.name.as_str()) {
            return Err(ContractError::config_validation(
                format!("sinks[name={}]", sink.name),
                "duplicate sink name",
            ));
        }
        if sink.queue_capacity == 0 {
            return Err(ContractError::config_validation(
                format!("sinks[{}].queue_capacity", sink.name),
                "queue_capacity must be >= 1",
            ));
        }
        if sink.sink_type == SinkType::File && !sink.params.contains_key("path") {
            return Err(ContractError::config_validation(
                format!("sinks[{}].params.path", sink.name),
                "file sink requires a 'path' param",
            ));
        }
    }
    Ok(())
}
