//! Command implementations.

mod info;
mod send;
mod simulate;
mod validate;

pub use info::run_info;
pub use send::run_send;
pub use simulate::run_simulate;
pub use validate::run_validate;

use std::path::Path;

use anyhow::{Context, Result};
use contracts::RelayBlueprint;
use tracing::info;

use crate::error::CliError;

/// Load the blueprint at `path`, or the built-in defaults when no path is given
pub(crate) fn load_blueprint(path: Option<&Path>) -> Result<RelayBlueprint> {
    let Some(path) = path else {
        info!("No configuration given, using built-in defaults");
        return Ok(RelayBlueprint::default());
    };

    if !path.exists() {
        return Err(CliError::config_not_found(path.display().to_string()).into());
    }

    config_loader::ConfigLoader::load_from_path(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))
}
