//! # secretgate-core
//!
//! Core library for secretgate providing:
//! - Connection, credential, and retry configuration types
//! - Configuration file loading (secretgate.yaml) with environment overrides
//! - Validation of connection settings before any backend is contacted

pub mod config;
pub mod error;
pub mod types;

pub use config::LoadedConfig;
pub use error::{Error, Result};
pub use types::{
    AuthType, BackendKind, CacheConfig, ConnectionConfig, CredentialConfig, FlatCredentials,
    ProvidersConfig, RetryConfig, SecretsConfig,
};
