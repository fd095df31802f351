//! Systems Manager Parameter Store client

use super::into_fault;
use crate::client::{RemotePayload, RemoteSecretClient};
use crate::taxonomy::RemoteFault;
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_ssm::Client;
use secretgate_core::{BackendKind, ConnectionConfig};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Reads decrypted parameters by name or path
pub struct ParameterStoreClient {
    client: Client,
}

impl ParameterStoreClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Create a client, honouring a custom endpoint if one is configured
    pub fn from_sdk_config(sdk_config: &SdkConfig, connection: &ConnectionConfig) -> Self {
        let mut builder = aws_sdk_ssm::config::Builder::from(sdk_config);

        if let Some(endpoint) = connection.endpoint.as_deref() {
            debug!("Using custom Parameter Store endpoint: {}", endpoint);
            builder = builder.endpoint_url(endpoint);
        }

        Self::new(Client::from_conf(builder.build()))
    }
}

#[async_trait]
impl RemoteSecretClient for ParameterStoreClient {
    async fn fetch(
        &self,
        key: &str,
        _cancel: &CancellationToken,
    ) -> Result<RemotePayload, RemoteFault> {
        debug!("Fetching parameter: {}", key);

        let output = self
            .client
            .get_parameter()
            .name(key)
            .with_decryption(true)
            .send()
            .await
            .map_err(|err| into_fault(BackendKind::ParameterStore, err))?;

        Ok(output
            .parameter()
            .and_then(|parameter| parameter.value())
            .map(|value| RemotePayload::Text(value.to_string()))
            .unwrap_or(RemotePayload::Empty))
    }
}
