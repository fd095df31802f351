//! Secret resolution for secretgate
//!
//! This crate reads secrets from AWS Systems Manager Parameter Store and AWS
//! Secrets Manager behind a single lookup interface:
//! - **Credentials**: ambient identity, static keys, or temporary session credentials
//! - **Caching**: one cache per backend kind with a shared expiry horizon
//! - **Errors**: backend failures translated into a small, stable set of kinds
//! - **Security**: zeroized secret storage, redacted debug output, audit logging

pub mod adapter;
pub mod aws;
pub mod cache;
pub mod client;
pub mod credentials;
pub mod error;
pub mod factory;
pub mod security;
pub mod taxonomy;

// Re-export commonly used items
pub use adapter::{BackendAdapter, SecretService};
pub use aws::{AwsClientFactory, ParameterStoreClient, SecretsManagerClient};
pub use cache::{CacheRegistry, CacheStats, SecretCache, DEFAULT_REFRESH_INTERVAL};
pub use client::{RemoteClientFactory, RemotePayload, RemoteSecretClient};
pub use credentials::{resolve_credentials, AuthStrategy};
pub use error::{DomainError, ErrorKind, Result, SecretsError};
pub use factory::SecretServiceFactory;
pub use security::{AuditLog, SecureString, ValueOrigin};
pub use taxonomy::{classify, translate, RemoteFault, TransportFailure};
pub use tokio_util::sync::CancellationToken;
