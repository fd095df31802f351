//! Configuration file loading and environment overrides
//!
//! Lookup order for the configuration file:
//! 1. Explicit path passed by the caller
//! 2. `SECRETGATE_CONFIG` environment variable
//! 3. `secretgate.yaml` / `secretgate.yml` in the current directory or a parent
//!
//! After parsing, `SECRETGATE_*` environment variables override file values.

use crate::error::{Error, Result};
use crate::types::{BackendKind, SecretsConfig};
use camino::{Utf8Path, Utf8PathBuf};
use std::env;
use std::fs;
use tracing::{debug, info};

/// Configuration file names to search for
const CONFIG_FILE_NAMES: &[&str] = &["secretgate.yaml", "secretgate.yml"];

/// Environment variable naming an explicit configuration file
pub const CONFIG_ENV_VAR: &str = "SECRETGATE_CONFIG";

const DEFAULT_PROVIDER_ENV: &str = "SECRETGATE_DEFAULT_PROVIDER";
const REGION_ENV: &str = "SECRETGATE_REGION";
const CACHE_REFRESH_ENV: &str = "SECRETGATE_CACHE_REFRESH_SECS";

/// Loaded and validated secretgate configuration
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// The parsed configuration
    pub config: SecretsConfig,

    /// Path to the configuration file
    pub config_path: Utf8PathBuf,
}

impl LoadedConfig {
    /// Load configuration from the specified path or search for it
    pub fn load(path: Option<&Utf8Path>) -> Result<Self> {
        let (config_path, content) = match path {
            Some(p) => (p.to_owned(), Self::read(p)?),
            None => match env::var(CONFIG_ENV_VAR) {
                Ok(p) if !p.trim().is_empty() => {
                    let p = Utf8PathBuf::from(p);
                    let content = Self::read(&p)?;
                    (p, content)
                }
                _ => Self::find_config()?,
            },
        };

        let config = Self::parse(&content)?;
        info!("Loaded configuration from {}", config_path);

        Ok(Self {
            config,
            config_path,
        })
    }

    /// Parse YAML, apply environment overrides, and validate
    pub fn parse(content: &str) -> Result<SecretsConfig> {
        let config: SecretsConfig = serde_yaml_ng::from_str(content)?;
        let config = apply_env_overrides(config)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the inner configuration
    pub fn inner(&self) -> &SecretsConfig {
        &self.config
    }

    fn read(path: &Utf8Path) -> Result<String> {
        fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::config_not_found(path.as_str())
            } else {
                Error::Io(e)
            }
        })
    }

    /// Find configuration file in current directory or parent directories
    fn find_config() -> Result<(Utf8PathBuf, String)> {
        let cwd = env::current_dir()?;
        let cwd = Utf8PathBuf::try_from(cwd)
            .map_err(|_| Error::invalid_config("Current directory path is not valid UTF-8"))?;

        let mut current = cwd.as_path();

        loop {
            for name in CONFIG_FILE_NAMES {
                let path = current.join(name);
                if path.exists() {
                    let content = fs::read_to_string(&path)?;
                    return Ok((path, content));
                }
            }

            match current.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }

        Err(Error::config_not_found(
            "secretgate.yaml (searched current and parent directories)",
        ))
    }
}

/// Apply `SECRETGATE_*` overrides on top of file values
fn apply_env_overrides(mut config: SecretsConfig) -> Result<SecretsConfig> {
    if let Ok(val) = env::var(DEFAULT_PROVIDER_ENV) {
        config.default_provider = val.parse::<BackendKind>()?;
        debug!("{} overrides default provider: {}", DEFAULT_PROVIDER_ENV, val);
    }

    if let Ok(val) = env::var(REGION_ENV) {
        if let Some(connection) = config.connection_mut(config.default_provider).as_mut() {
            connection.region = val;
        }
    }

    if let Ok(val) = env::var(CACHE_REFRESH_ENV) {
        config.cache.refresh_interval_secs = val.parse().map_err(|_| {
            Error::invalid_config(format!("{} must be a valid number", CACHE_REFRESH_ENV))
        })?;
    }

    Ok(config)
}
