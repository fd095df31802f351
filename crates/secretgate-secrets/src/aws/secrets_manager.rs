//! Secrets Manager client

use super::into_fault;
use crate::client::{RemotePayload, RemoteSecretClient};
use crate::taxonomy::RemoteFault;
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_secretsmanager::Client;
use secretgate_core::{BackendKind, ConnectionConfig};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Connection property selecting the version stage to read
pub const VERSION_STAGE_PROPERTY: &str = "version-stage";

/// Reads string or binary secrets by name or ARN
pub struct SecretsManagerClient {
    client: Client,
    version_stage: Option<String>,
}

impl SecretsManagerClient {
    pub fn new(client: Client, version_stage: Option<String>) -> Self {
        Self {
            client,
            version_stage,
        }
    }

    /// Create a client, honouring a custom endpoint if one is configured
    pub fn from_sdk_config(sdk_config: &SdkConfig, connection: &ConnectionConfig) -> Self {
        let mut builder = aws_sdk_secretsmanager::config::Builder::from(sdk_config);

        if let Some(endpoint) = connection.endpoint.as_deref() {
            debug!("Using custom Secrets Manager endpoint: {}", endpoint);
            builder = builder.endpoint_url(endpoint);
        }

        let version_stage = connection
            .property(VERSION_STAGE_PROPERTY)
            .map(str::to_string);

        Self::new(Client::from_conf(builder.build()), version_stage)
    }
}

#[async_trait]
impl RemoteSecretClient for SecretsManagerClient {
    async fn fetch(
        &self,
        key: &str,
        _cancel: &CancellationToken,
    ) -> Result<RemotePayload, RemoteFault> {
        debug!("Fetching secret: {}", key);

        let output = self
            .client
            .get_secret_value()
            .secret_id(key)
            .set_version_stage(self.version_stage.clone())
            .send()
            .await
            .map_err(|err| into_fault(BackendKind::SecretsManager, err))?;

        if let Some(value) = output.secret_string() {
            return Ok(RemotePayload::Text(value.to_string()));
        }

        Ok(output
            .secret_binary()
            .map(|blob| RemotePayload::Binary(blob.as_ref().to_vec()))
            .unwrap_or(RemotePayload::Empty))
    }
}
