//! `simulate` command implementation.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{info, warn};

use crate::cli::SimulateArgs;
use crate::simulation::{Simulation, SimulationConfig};

/// Execute the `simulate` command
pub async fn run_simulate(args: &SimulateArgs) -> Result<()> {
    let blueprint = super::load_blueprint(args.config.as_deref())?;

    info!(
        providers = blueprint.providers.len(),
        max_retries = blueprint.dispatch.max_retries,
        limit = blueprint.rate_limit.limit,
        window_secs = blueprint.rate_limit.window_secs,
        sinks = blueprint.sinks.len(),
        "Configuration loaded"
    );

    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
    }

    let config = SimulationConfig {
        blueprint,
        count: args.count,
        duplicate_every: (args.duplicate_every > 0).then_some(args.duplicate_every),
        interval: (args.interval_ms > 0).then(|| Duration::from_millis(args.interval_ms)),
        seed: args.seed,
    };

    let stats = Simulation::new(config)
        .run(shutdown_signal())
        .await
        .context("Simulation failed")?;

    info!(
        messages = stats.messages,
        sent = stats.dispatch.sent,
        duration_secs = stats.duration.as_secs_f64(),
        "Simulation completed"
    );
    stats.print_summary();

    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
