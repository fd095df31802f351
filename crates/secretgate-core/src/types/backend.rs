use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The remote secret stores secretgate can front
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    /// Path-addressed key/value store (AWS Systems Manager Parameter Store)
    #[default]
    ParameterStore,
    /// JSON/string secret store (AWS Secrets Manager)
    SecretsManager,
}

impl BackendKind {
    /// Every supported backend kind
    pub const ALL: [BackendKind; 2] = [BackendKind::ParameterStore, BackendKind::SecretsManager];

    /// Name used in configuration files and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::ParameterStore => "parameter-store",
            BackendKind::SecretsManager => "secrets-manager",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "parameter-store" | "parameterstore" | "ssm" => Ok(BackendKind::ParameterStore),
            "secrets-manager" | "secretsmanager" => Ok(BackendKind::SecretsManager),
            other => Err(Error::unknown_provider(other)),
        }
    }
}
