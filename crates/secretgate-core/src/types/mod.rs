//! Type definitions for secretgate configuration

mod backend;
mod connection;
mod secrets_config;

pub use backend::BackendKind;
pub use connection::{AuthType, ConnectionConfig, CredentialConfig, FlatCredentials, RetryConfig};
pub use secrets_config::{CacheConfig, ProvidersConfig, SecretsConfig};
