//! Seam between adapters and the remote secret stores

use crate::credentials::AuthStrategy;
use crate::error::DomainError;
use crate::taxonomy::RemoteFault;
use async_trait::async_trait;
use secretgate_core::{BackendKind, ConnectionConfig};
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Raw value returned by a backend before extraction
#[derive(Clone, PartialEq, Eq)]
pub enum RemotePayload {
    Text(String),
    Binary(Vec<u8>),
    /// The backend answered but carried no value
    Empty,
}

impl fmt::Debug for RemotePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemotePayload::Text(s) => write!(f, "Text([REDACTED {} bytes])", s.len()),
            RemotePayload::Binary(b) => write!(f, "Binary([REDACTED {} bytes])", b.len()),
            RemotePayload::Empty => write!(f, "Empty"),
        }
    }
}

/// A client able to fetch one value by key from a remote store
///
/// Implementations apply the connection's retry settings themselves.
#[async_trait]
pub trait RemoteSecretClient: Send + Sync {
    /// Fetch the raw value stored under `key`
    ///
    /// The adapter stops waiting once `cancel` fires; implementations may also
    /// observe it to abandon work early.
    async fn fetch(
        &self,
        key: &str,
        cancel: &CancellationToken,
    ) -> Result<RemotePayload, RemoteFault>;
}

/// Builds remote clients from a resolved strategy and connection settings
#[async_trait]
pub trait RemoteClientFactory: Send + Sync {
    async fn create_client(
        &self,
        kind: BackendKind,
        connection: &ConnectionConfig,
        strategy: &AuthStrategy,
    ) -> Result<Arc<dyn RemoteSecretClient>, DomainError>;
}
