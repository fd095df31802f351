//! Command implementations

pub mod config;
pub mod get;

use anyhow::{Context, Result};
use camino::Utf8Path;
use secretgate_core::LoadedConfig;
use tracing::debug;

/// Load configuration from an explicit path, the environment, or by search
pub(crate) fn load_config(path: Option<&Utf8Path>) -> Result<LoadedConfig> {
    let loaded = LoadedConfig::load(path).context("Failed to load secretgate configuration")?;
    debug!("Using configuration: {}", loaded.config_path);
    Ok(loaded)
}
