//! Service construction from configuration

use crate::adapter::{BackendAdapter, SecretService};
use crate::aws::AwsClientFactory;
use crate::cache::{CacheRegistry, SecretCache};
use crate::client::RemoteClientFactory;
use crate::error::DomainError;
use secretgate_core::{BackendKind, SecretsConfig};
use std::sync::Arc;
use tracing::debug;

/// Builds [`SecretService`]s for the backends named in a [`SecretsConfig`]
///
/// The factory owns one cache per backend kind. Every service it creates for
/// a kind reads and fills that kind's cache, so an application builds one
/// factory and keeps it for the life of the process.
pub struct SecretServiceFactory {
    config: SecretsConfig,
    clients: Arc<dyn RemoteClientFactory>,
    caches: CacheRegistry,
}

impl SecretServiceFactory {
    /// Create a factory backed by the AWS SDK clients
    pub fn new(config: SecretsConfig) -> Self {
        Self::with_client_factory(config, Arc::new(AwsClientFactory))
    }

    /// Create a factory with a custom remote client factory
    pub fn with_client_factory(config: SecretsConfig, clients: Arc<dyn RemoteClientFactory>) -> Self {
        let caches = CacheRegistry::with_refresh_interval(config.cache.refresh_interval());
        Self {
            config,
            clients,
            caches,
        }
    }

    pub fn config(&self) -> &SecretsConfig {
        &self.config
    }

    /// The cache shared by every service of `kind` built by this factory
    pub fn cache(&self, kind: BackendKind) -> Arc<SecretCache> {
        Arc::clone(self.caches.get(kind))
    }

    /// Bind the default provider's connection to an adapter
    pub async fn create_service(&self) -> Result<Arc<dyn SecretService>, DomainError> {
        self.create_service_for(self.config.default_provider).await
    }

    /// Bind the connection configured for `kind` to an adapter
    pub async fn create_service_for(
        &self,
        kind: BackendKind,
    ) -> Result<Arc<dyn SecretService>, DomainError> {
        let connection = self.config.connection(kind)?.clone();

        if self.config.cache.refresh_interval().is_zero() {
            return Err(DomainError::configuration(
                "cache refresh interval must be greater than zero",
            ));
        }

        debug!("Creating secret service for {}", kind);
        let adapter =
            BackendAdapter::connect(kind, connection, self.clients.as_ref(), self.cache(kind))
                .await?;
        Ok(Arc::new(adapter))
    }
}
