//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{ProviderKind, RelayBlueprint};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    provider_count: usize,
    max_attempts: Option<u32>,
    rate_limit: String,
    sink_count: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    provider_count: blueprint.providers.len(),
                    max_attempts: blueprint.max_attempts(),
                    rate_limit: format!(
                        "{} per {}s",
                        blueprint.rate_limit.limit, blueprint.rate_limit.window_secs
                    ),
                    sink_count: blueprint.sinks.len(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &RelayBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    if blueprint.providers.len() == 1 {
        warnings.push("Only one provider configured - no failover is possible".to_string());
    }

    for provider in &blueprint.providers {
        match provider.kind {
            ProviderKind::AlwaysFail => warnings.push(format!(
                "Provider '{}' is always_fail - every attempt on it fails",
                provider.name
            )),
            ProviderKind::Simulated if provider.success_rate == 0.0 => warnings.push(format!(
                "Provider '{}' has success_rate 0 - it never delivers",
                provider.name
            )),
            _ => {}
        }
    }

    if blueprint.dispatch.max_retries == 0 {
        warnings.push(
            "max_retries is 0 - every dispatch is exhausted without an attempt".to_string(),
        );
    }

    if blueprint
        .providers
        .iter()
        .all(|p| p.kind == ProviderKind::AlwaysFail)
    {
        warnings.push("No provider can deliver - every dispatch will be exhausted".to_string());
    }

    if blueprint.sinks.is_empty() {
        warnings.push("No sinks configured - events only reach in-process handlers".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Providers: {}", summary.provider_count);
            if let Some(max_attempts) = summary.max_attempts {
                println!("  Retry budget: {} attempts", max_attempts);
            }
            println!("  Rate limit: {}", summary.rate_limit);
            println!("  Sinks: {}", summary.sink_count);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
