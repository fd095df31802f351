//! Top-level secretgate configuration

use super::{BackendKind, ConnectionConfig};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root of secretgate.yaml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SecretsConfig {
    /// Backend used when a caller does not name one
    #[serde(default)]
    pub default_provider: BackendKind,

    #[serde(default)]
    pub providers: ProvidersConfig,

    #[serde(default)]
    pub cache: CacheConfig,
}

/// Per-backend connection settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProvidersConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter_store: Option<ConnectionConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secrets_manager: Option<ConnectionConfig>,
}

/// Shared cache settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CacheConfig {
    /// Seconds after which the whole cache of a backend kind is dropped
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
}

impl CacheConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval_secs(),
        }
    }
}

fn default_refresh_interval_secs() -> u64 {
    600
}

impl SecretsConfig {
    /// Connection settings for a backend kind
    pub fn connection(&self, kind: BackendKind) -> Result<&ConnectionConfig> {
        let connection = match kind {
            BackendKind::ParameterStore => self.providers.parameter_store.as_ref(),
            BackendKind::SecretsManager => self.providers.secrets_manager.as_ref(),
        };
        connection.ok_or_else(|| Error::missing_field(format!("providers.{}", kind)))
    }

    /// Mutable connection settings, created on demand
    pub fn connection_mut(&mut self, kind: BackendKind) -> &mut Option<ConnectionConfig> {
        match kind {
            BackendKind::ParameterStore => &mut self.providers.parameter_store,
            BackendKind::SecretsManager => &mut self.providers.secrets_manager,
        }
    }

    /// Backend kinds that have a connection block
    pub fn configured_backends(&self) -> Vec<BackendKind> {
        BackendKind::ALL
            .into_iter()
            .filter(|kind| self.connection(*kind).is_ok())
            .collect()
    }

    /// Validate the whole configuration
    pub fn validate(&self) -> Result<()> {
        self.connection(self.default_provider)?;

        for kind in self.configured_backends() {
            self.connection(kind)?.validate().map_err(|e| {
                Error::invalid_config(format!("providers.{}: {}", kind, e))
            })?;
        }

        if self.cache.refresh_interval_secs == 0 {
            return Err(Error::invalid_config(
                "cache refresh-interval-secs must be greater than zero",
            ));
        }

        Ok(())
    }
}
