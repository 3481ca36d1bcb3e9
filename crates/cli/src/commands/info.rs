//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::{ProviderKind, RelayBlueprint};
use serde::Serialize;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    providers: Vec<ProviderInfo>,
    retry: RetryInfo,
    rate_limit: RateLimitInfo,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sinks: Vec<SinkInfo>,
}

#[derive(Serialize)]
struct ProviderInfo {
    position: usize,
    name: String,
    kind: ProviderKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    success_rate: Option<f64>,
}

#[derive(Serialize)]
struct RetryInfo {
    max_retries: u32,
    /// `None` when the budget overflows
    max_attempts: Option<u32>,
}

#[derive(Serialize)]
struct RateLimitInfo {
    limit: u32,
    window_secs: u64,
}

#[derive(Serialize)]
struct SinkInfo {
    name: String,
    sink_type: String,
    queue_capacity: usize,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    let blueprint = super::load_blueprint(args.config.as_deref())?;

    if args.json {
        let info = build_config_info(&blueprint);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&blueprint);
    }

    Ok(())
}

fn build_config_info(blueprint: &RelayBlueprint) -> ConfigInfo {
    let providers = blueprint
        .providers
        .iter()
        .enumerate()
        .map(|(position, p)| ProviderInfo {
            position,
            name: p.name.clone(),
            kind: p.kind,
            success_rate: (p.kind == ProviderKind::Simulated).then_some(p.success_rate),
        })
        .collect();

    let sinks = blueprint
        .sinks
        .iter()
        .map(|s| SinkInfo {
            name: s.name.clone(),
            sink_type: format!("{:?}", s.sink_type),
            queue_capacity: s.queue_capacity,
        })
        .collect();

    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        providers,
        retry: RetryInfo {
            max_retries: blueprint.dispatch.max_retries,
            max_attempts: blueprint.max_attempts(),
        },
        rate_limit: RateLimitInfo {
            limit: blueprint.rate_limit.limit,
            window_secs: blueprint.rate_limit.window_secs,
        },
        sinks,
    }
}

fn print_config_info(blueprint: &RelayBlueprint) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                  mailrelay Configuration                     ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("📮 Providers ({}) - rotation order", blueprint.providers.len());
    for (i, provider) in blueprint.providers.iter().enumerate() {
        let prefix = if i == blueprint.providers.len() - 1 { "└─" } else { "├─" };
        match provider.kind {
            ProviderKind::Simulated => println!(
                "   {} {} (simulated, {:.0}% success)",
                prefix,
                provider.name,
                provider.success_rate * 100.0
            ),
            kind => println!("   {} {} ({:?})", prefix, provider.name, kind),
        }
    }

    println!("\n🔁 Retry");
    println!("   ├─ Max retries: {}", blueprint.dispatch.max_retries);
    match blueprint.max_attempts() {
        Some(n) => println!("   └─ Budget per dispatch: {} attempts", n),
        None => println!("   └─ Budget per dispatch: overflows"),
    }

    println!("\n⏱  Rate Limit");
    println!(
        "   └─ {} dispatches per {}s window",
        blueprint.rate_limit.limit, blueprint.rate_limit.window_secs
    );

    if !blueprint.sinks.is_empty() {
        println!("\n📤 Sinks ({})", blueprint.sinks.len());
        for (i, sink) in blueprint.sinks.iter().enumerate() {
            let prefix = if i == blueprint.sinks.len() - 1 { "└─" } else { "├─" };
            println!(
                "   {} {} ({:?}, queue {})",
                prefix, sink.name, sink.sink_type, sink.queue_capacity
            );
        }
    }

    println!();
}
