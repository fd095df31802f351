//! AWS-backed remote clients
//!
//! - [`ParameterStoreClient`]: Systems Manager Parameter Store (path-addressed)
//! - [`SecretsManagerClient`]: Secrets Manager (JSON/string secrets)
//!
//! Both are built from one shared `SdkConfig` carrying the region, the
//! resolved credentials, and the transport retry policy.

mod parameter_store;
mod secrets_manager;

pub use parameter_store::ParameterStoreClient;
pub use secrets_manager::SecretsManagerClient;

use crate::client::{RemoteClientFactory, RemoteSecretClient};
use crate::credentials::AuthStrategy;
use crate::error::DomainError;
use crate::taxonomy::{RemoteFault, TransportFailure};
use async_trait::async_trait;
use aws_config::retry::RetryConfig as AwsRetryConfig;
use aws_config::timeout::TimeoutConfig;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_ssm::config::Credentials;
use aws_sdk_ssm::error::{ProvideErrorMetadata, SdkError};
use secretgate_core::{BackendKind, ConnectionConfig, RetryConfig};
use std::error::Error as StdError;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Name reported by explicitly configured credentials
const CREDENTIALS_PROVIDER_NAME: &str = "secretgate";

/// Connection property bounding a whole request, retries included
pub const OPERATION_TIMEOUT_PROPERTY: &str = "operation-timeout-secs";

/// Creates AWS SDK clients for each backend kind
#[derive(Debug, Clone, Copy, Default)]
pub struct AwsClientFactory;

#[async_trait]
impl RemoteClientFactory for AwsClientFactory {
    async fn create_client(
        &self,
        kind: BackendKind,
        connection: &ConnectionConfig,
        strategy: &AuthStrategy,
    ) -> Result<Arc<dyn RemoteSecretClient>, DomainError> {
        let sdk_config = load_sdk_config(connection, strategy).await?;

        let client: Arc<dyn RemoteSecretClient> = match kind {
            BackendKind::ParameterStore => {
                Arc::new(ParameterStoreClient::from_sdk_config(&sdk_config, connection))
            }
            BackendKind::SecretsManager => {
                Arc::new(SecretsManagerClient::from_sdk_config(&sdk_config, connection))
            }
        };
        Ok(client)
    }
}

/// Build the shared SDK configuration for a connection
pub async fn load_sdk_config(
    connection: &ConnectionConfig,
    strategy: &AuthStrategy,
) -> Result<SdkConfig, DomainError> {
    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(connection.region.clone()))
        .retry_config(retry_config(&connection.retry));

    if let Some(timeout) = operation_timeout(connection)? {
        loader = loader.timeout_config(TimeoutConfig::builder().operation_timeout(timeout).build());
    }

    match strategy {
        AuthStrategy::Ambient => {
            debug!("Using ambient AWS credentials");
        }
        AuthStrategy::Static {
            access_key,
            secret_key,
        } => {
            loader = loader.credentials_provider(Credentials::new(
                access_key.clone(),
                secret_key.as_str().to_owned(),
                None,
                None,
                CREDENTIALS_PROVIDER_NAME,
            ));
        }
        AuthStrategy::Temporary {
            access_key,
            secret_key,
            session_token,
        } => {
            loader = loader.credentials_provider(Credentials::new(
                access_key.clone(),
                secret_key.as_str().to_owned(),
                Some(session_token.as_str().to_owned()),
                None,
                CREDENTIALS_PROVIDER_NAME,
            ));
        }
    }

    Ok(loader.load().await)
}

/// Map retry settings onto the SDK's standard retry strategy
fn retry_config(retry: &RetryConfig) -> AwsRetryConfig {
    if !retry.enabled {
        return AwsRetryConfig::disabled();
    }

    AwsRetryConfig::standard()
        .with_max_attempts(retry.max_retries.saturating_add(1))
        .with_initial_backoff(retry.delay())
}

fn operation_timeout(connection: &ConnectionConfig) -> Result<Option<Duration>, DomainError> {
    connection
        .property(OPERATION_TIMEOUT_PROPERTY)
        .map(|raw| {
            raw.trim().parse::<u64>().map(Duration::from_secs).map_err(|_| {
                DomainError::configuration(format!(
                    "{} must be a whole number of seconds, got '{}'",
                    OPERATION_TIMEOUT_PROPERTY, raw
                ))
            })
        })
        .transpose()
}

/// Describe an SDK failure as a [`RemoteFault`] for `backend`
fn into_fault<E>(backend: BackendKind, err: SdkError<E>) -> RemoteFault
where
    E: ProvideErrorMetadata + StdError + Send + Sync + 'static,
{
    let fault = match &err {
        SdkError::ServiceError(context) => {
            let service_error = context.err();
            let fault = RemoteFault::new(
                backend,
                service_error.message().unwrap_or("service error"),
            )
            .with_status(context.raw().status().as_u16());
            match service_error.code() {
                Some(code) => fault.with_code(code),
                None => fault,
            }
        }
        SdkError::TimeoutError(_) => {
            RemoteFault::new(backend, "request timed out").with_transport(TransportFailure::Timeout)
        }
        SdkError::DispatchFailure(failure) => {
            let transport = if failure.is_timeout() {
                TransportFailure::Timeout
            } else {
                TransportFailure::Unreachable
            };
            RemoteFault::new(backend, "request could not be dispatched").with_transport(transport)
        }
        SdkError::ResponseError(context) => RemoteFault::new(backend, "unreadable response")
            .with_status(context.raw().status().as_u16()),
        _ => RemoteFault::new(backend, err.to_string()),
    };

    fault.with_source(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::taxonomy::classify;
    use aws_sdk_secretsmanager::operation::get_secret_value::GetSecretValueError;
    use aws_sdk_ssm::operation::get_parameter::GetParameterError;

    #[test]
    fn test_retry_config_mapping() {
        let retry = RetryConfig {
            max_retries: 4,
            delay_seconds: 2,
            enabled: true,
        };
        let aws = retry_config(&retry);
        assert_eq!(aws.max_attempts(), 5);
        assert_eq!(aws.initial_backoff(), Duration::from_secs(2));

        assert_eq!(retry_config(&RetryConfig::disabled()).max_attempts(), 1);
    }

    #[test]
    fn test_operation_timeout_property() {
        let connection =
            ConnectionConfig::new("us-east-1").with_property(OPERATION_TIMEOUT_PROPERTY, "15");
        assert_eq!(
            operation_timeout(&connection).unwrap(),
            Some(Duration::from_secs(15))
        );

        assert_eq!(
            operation_timeout(&ConnectionConfig::new("us-east-1")).unwrap(),
            None
        );

        let bad = ConnectionConfig::new("us-east-1").with_property(OPERATION_TIMEOUT_PROPERTY, "soon");
        assert_eq!(
            operation_timeout(&bad).unwrap_err().kind(),
            ErrorKind::Configuration
        );
    }

    #[tokio::test]
    async fn test_sdk_config_carries_region_and_credentials() {
        let connection = ConnectionConfig::new("eu-west-1");
        let strategy = AuthStrategy::Static {
            access_key: "AKIDEXAMPLE".into(),
            secret_key: "wJalrXUtnFEMI".into(),
        };

        let sdk_config = load_sdk_config(&connection, &strategy).await.unwrap();
        assert_eq!(sdk_config.region().map(|r| r.as_ref()), Some("eu-west-1"));
        assert!(sdk_config.credentials_provider().is_some());
    }

    #[test]
    fn test_timeout_becomes_transport_failure() {
        let err = SdkError::<GetParameterError>::timeout_error("deadline exceeded");
        let fault = into_fault(BackendKind::ParameterStore, err);

        assert_eq!(fault.backend, BackendKind::ParameterStore);
        assert_eq!(fault.transport, Some(TransportFailure::Timeout));
        assert_eq!(classify(&fault), ErrorKind::Timeout);
        assert!(StdError::source(&fault).is_some());
    }

    #[test]
    fn test_unclassified_sdk_failure_is_internal() {
        let err = SdkError::<GetSecretValueError>::construction_failure("missing secret id");
        let fault = into_fault(BackendKind::SecretsManager, err);

        assert_eq!(fault.code, None);
        assert_eq!(fault.transport, None);
        assert_eq!(classify(&fault), ErrorKind::Internal);
    }
}
