//! Credential resolution
//!
//! Turns a declarative [`CredentialConfig`] into the authentication strategy
//! handed to the remote client factory. Runs once per adapter, at
//! construction.

use crate::error::DomainError;
use crate::security::SecureString;
use secretgate_core::CredentialConfig;
use std::fmt;
use tracing::debug;

/// How a remote client authenticates
#[derive(Clone, PartialEq, Eq)]
pub enum AuthStrategy {
    /// Defer to the environment's default identity chain
    Ambient,
    /// Long-term access key / secret key pair
    Static {
        access_key: String,
        secret_key: SecureString,
    },
    /// Temporary credentials with a session token
    Temporary {
        access_key: String,
        secret_key: SecureString,
        session_token: SecureString,
    },
}

impl AuthStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            AuthStrategy::Ambient => "ambient",
            AuthStrategy::Static { .. } => "static",
            AuthStrategy::Temporary { .. } => "temporary",
        }
    }
}

impl fmt::Debug for AuthStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthStrategy::Ambient => write!(f, "Ambient"),
            AuthStrategy::Static { access_key, .. } => f
                .debug_struct("Static")
                .field("access_key", access_key)
                .finish_non_exhaustive(),
            AuthStrategy::Temporary { access_key, .. } => f
                .debug_struct("Temporary")
                .field("access_key", access_key)
                .finish_non_exhaustive(),
        }
    }
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|v| !v.is_empty())
}

/// Resolve the authentication strategy for a credential configuration
pub fn resolve_credentials(config: &CredentialConfig) -> Result<AuthStrategy, DomainError> {
    let access_key = present(&config.access_key);
    let secret_key = present(&config.secret_key);
    let session_token = present(&config.session_token);

    let strategy = match (access_key, secret_key, session_token) {
        (None, None, None) => AuthStrategy::Ambient,
        (Some(access_key), Some(secret_key), Some(session_token)) => AuthStrategy::Temporary {
            access_key: access_key.to_string(),
            secret_key: secret_key.into(),
            session_token: session_token.into(),
        },
        (_, _, Some(_)) => {
            return Err(DomainError::configuration(
                "STS-style credentials require access key, secret key, and session token",
            ))
        }
        (Some(access_key), Some(secret_key), None) => AuthStrategy::Static {
            access_key: access_key.to_string(),
            secret_key: secret_key.into(),
        },
        (Some(_), None, None) | (None, Some(_), None) => {
            return Err(DomainError::configuration(
                "both access key and secret key must be provided together",
            ))
        }
    };

    debug!(
        auth_type = ?config.auth_type,
        strategy = strategy.name(),
        "Resolved credential strategy"
    );

    Ok(strategy)
}
