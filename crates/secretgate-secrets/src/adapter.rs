//! Backend adapters
//!
//! A [`BackendAdapter`] runs the fixed lookup pipeline for one backend kind:
//! validate the key, consult the shared cache, fetch from the remote client
//! on a miss, translate failures, and fill the cache on success.

use crate::cache::SecretCache;
use crate::client::{RemoteClientFactory, RemotePayload, RemoteSecretClient};
use crate::credentials::resolve_credentials;
use crate::error::{DomainError, Result, SecretsError};
use crate::security::{AuditLog, ValueOrigin};
use crate::taxonomy::translate;
use async_trait::async_trait;
use base64::prelude::{Engine as _, BASE64_STANDARD};
use secretgate_core::{BackendKind, ConnectionConfig};
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Uniform lookup interface over every backend kind
#[async_trait]
pub trait SecretService: Send + Sync {
    /// Backend kind this service reads from
    fn backend(&self) -> BackendKind;

    /// Retrieve the value stored under `key`
    ///
    /// Empty keys and keys made only of whitespace fail with
    /// [`SecretsError::InvalidArgument`] before the cache or the backend is
    /// consulted.
    async fn get_secret(&self, key: &str, cancel: &CancellationToken) -> Result<String>;
}

/// Cache-fronted adapter for one remote secret store
pub struct BackendAdapter {
    kind: BackendKind,
    connection: ConnectionConfig,
    client: Arc<dyn RemoteSecretClient>,
    cache: Arc<SecretCache>,
}

impl BackendAdapter {
    /// Assemble an adapter from an existing client and cache
    pub fn new(
        kind: BackendKind,
        connection: ConnectionConfig,
        client: Arc<dyn RemoteSecretClient>,
        cache: Arc<SecretCache>,
    ) -> std::result::Result<Self, DomainError> {
        connection.validate()?;

        Ok(Self {
            kind,
            connection,
            client,
            cache,
        })
    }

    /// Validate the connection, resolve credentials, and build the client
    ///
    /// `cache` should be the one shared by every adapter of `kind`.
    pub async fn connect(
        kind: BackendKind,
        connection: ConnectionConfig,
        clients: &dyn RemoteClientFactory,
        cache: Arc<SecretCache>,
    ) -> std::result::Result<Self, DomainError> {
        connection.validate()?;
        let strategy = resolve_credentials(&connection.credentials)?;
        let client = clients.create_client(kind, &connection, &strategy).await?;

        info!(
            backend = %kind,
            region = %connection.region,
            strategy = strategy.name(),
            "Connected secret backend"
        );

        Self::new(kind, connection, client, cache)
    }

    pub fn connection(&self) -> &ConnectionConfig {
        &self.connection
    }

    pub fn cache(&self) -> &Arc<SecretCache> {
        &self.cache
    }

    async fn fetch_remote(&self, key: &str, cancel: &CancellationToken) -> Result<String> {
        let fetched = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(backend = %self.kind, key = %key, "Lookup cancelled");
                return Err(SecretsError::Cancelled { key: key.to_string() });
            }
            fetched = self.client.fetch(key, cancel) => fetched,
        };

        let payload = fetched.map_err(|fault| translate(fault, key))?;
        let value = extract_value(self.kind, key, payload)?;

        self.cache.fill(key, &value);
        Ok(value)
    }
}

#[async_trait]
impl SecretService for BackendAdapter {
    fn backend(&self) -> BackendKind {
        self.kind
    }

    async fn get_secret(&self, key: &str, cancel: &CancellationToken) -> Result<String> {
        validate_key(key)?;

        if let Some(value) = self.cache.lookup(key) {
            AuditLog::new(self.kind, key)
                .served_from(ValueOrigin::Cache)
                .log();
            return Ok(value);
        }

        let result = self.fetch_remote(key, cancel).await;
        match &result {
            Ok(_) => AuditLog::new(self.kind, key)
                .served_from(ValueOrigin::Remote)
                .log(),
            Err(SecretsError::Domain(err)) => AuditLog::new(self.kind, key)
                .with_error(err.kind().as_str())
                .log(),
            Err(_) => {}
        }
        result
    }
}

impl fmt::Debug for BackendAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendAdapter")
            .field("kind", &self.kind)
            .field("region", &self.connection.region)
            .field("endpoint", &self.connection.endpoint)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

fn validate_key(key: &str) -> Result<()> {
    if key.trim().is_empty() {
        return Err(SecretsError::invalid_argument(
            "secret key must not be empty",
        ));
    }
    Ok(())
}

/// Turn a raw payload into the string handed to callers
fn extract_value(
    kind: BackendKind,
    key: &str,
    payload: RemotePayload,
) -> std::result::Result<String, DomainError> {
    match payload {
        RemotePayload::Text(value) => Ok(value),
        RemotePayload::Binary(bytes) => Ok(String::from_utf8(bytes)
            .unwrap_or_else(|invalid| BASE64_STANDARD.encode(invalid.as_bytes()))),
        RemotePayload::Empty => {
            Err(DomainError::internal(format!("{} returned no value", kind)).with_key(key))
        }
    }
}
