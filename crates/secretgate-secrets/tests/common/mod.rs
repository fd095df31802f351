//! Shared fixtures for secretgate-secrets integration tests
//!
//! - `MockClient`: mockall double for [`RemoteSecretClient`]
//! - `StalledClient`: a client whose fetch never completes
//! - `CountingClient`: answers `v0`, `v1`, ... with a slow first answer
//! - `RecordingFactory`: a [`RemoteClientFactory`] that records strategies

#![allow(dead_code)]

use async_trait::async_trait;
use mockall::mock;
use secretgate_core::{BackendKind, ConnectionConfig};
use secretgate_secrets::{
    AuthStrategy, DomainError, RemoteClientFactory, RemoteFault, RemotePayload,
    RemoteSecretClient, SecretCache,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

mock! {
    pub Client {}

    #[async_trait]
    impl RemoteSecretClient for Client {
        async fn fetch(
            &self,
            key: &str,
            cancel: &CancellationToken,
        ) -> Result<RemotePayload, RemoteFault>;
    }
}

/// Never answers; used to exercise cancellation
pub struct StalledClient;

#[async_trait]
impl RemoteSecretClient for StalledClient {
    async fn fetch(
        &self,
        _key: &str,
        _cancel: &CancellationToken,
    ) -> Result<RemotePayload, RemoteFault> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(RemotePayload::Empty)
    }
}

/// Returns a distinct value per call; the first call answers last
#[derive(Default)]
pub struct CountingClient {
    calls: AtomicUsize,
}

impl CountingClient {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteSecretClient for CountingClient {
    async fn fetch(
        &self,
        _key: &str,
        _cancel: &CancellationToken,
    ) -> Result<RemotePayload, RemoteFault> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call == 0 {
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
        Ok(RemotePayload::Text(format!("v{}", call)))
    }
}

/// Hands out one client and records every strategy it was asked for
pub struct RecordingFactory {
    client: Arc<dyn RemoteSecretClient>,
    pub requests: Mutex<Vec<(BackendKind, String, AuthStrategy)>>,
}

impl RecordingFactory {
    pub fn new(client: impl RemoteSecretClient + 'static) -> Self {
        Self {
            client: Arc::new(client),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn strategies(&self) -> Vec<AuthStrategy> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(_, _, strategy)| strategy.clone())
            .collect()
    }
}

#[async_trait]
impl RemoteClientFactory for RecordingFactory {
    async fn create_client(
        &self,
        kind: BackendKind,
        connection: &ConnectionConfig,
        strategy: &AuthStrategy,
    ) -> Result<Arc<dyn RemoteSecretClient>, DomainError> {
        self.requests
            .lock()
            .unwrap()
            .push((kind, connection.region.clone(), strategy.clone()));
        Ok(Arc::clone(&self.client))
    }
}

/// Text payload returned by a successful fetch
pub fn text(value: &str) -> Result<RemotePayload, RemoteFault> {
    Ok(RemotePayload::Text(value.to_string()))
}

/// The service error each backend reports for a missing key
pub fn not_found(kind: BackendKind) -> RemoteFault {
    let code = match kind {
        BackendKind::ParameterStore => "ParameterNotFound",
        BackendKind::SecretsManager => "ResourceNotFoundException",
    };
    RemoteFault::service(kind, code, "requested value does not exist").with_status(400)
}

/// A cache owned by a single test
pub fn isolated_cache(refresh: Duration) -> Arc<SecretCache> {
    Arc::new(SecretCache::with_refresh_interval("test", refresh))
}
