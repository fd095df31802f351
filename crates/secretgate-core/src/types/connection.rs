//! Connection, credential, and retry configuration for a single backend

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

/// Declared authentication scheme
///
/// The tag is descriptive. Which strategy is actually used is decided from
/// the populated credential fields when the adapter is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum AuthType {
    /// Ambient identity of the execution environment
    #[default]
    None,
    /// Long-term access key / secret key pair
    AccessKey,
    /// Temporary (STS-style) credentials with a session token
    SessionToken,
    /// Scheme described by the free-form property map
    Custom,
}

/// Credential configuration for a backend connection
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CredentialConfig {
    #[serde(default)]
    pub auth_type: AuthType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,

    /// Open-ended properties for custom or future schemes
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub properties: HashMap<String, String>,
}

impl CredentialConfig {
    /// Use the environment's default identity chain
    pub fn ambient() -> Self {
        Self::default()
    }

    /// Long-term access key / secret key pair
    pub fn access_key(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            auth_type: AuthType::AccessKey,
            access_key: Some(access_key.into()),
            secret_key: Some(secret_key.into()),
            ..Self::default()
        }
    }

    /// Temporary credentials issued with a session token
    pub fn session(
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
        session_token: impl Into<String>,
    ) -> Self {
        Self {
            auth_type: AuthType::SessionToken,
            access_key: Some(access_key.into()),
            secret_key: Some(secret_key.into()),
            session_token: Some(session_token.into()),
            ..Self::default()
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }
}

impl fmt::Debug for CredentialConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialConfig")
            .field("auth_type", &self.auth_type)
            .field("access_key", &self.access_key)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "[REDACTED]"))
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("properties", &self.properties.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Credential fields written directly on a connection block
///
/// Older configuration files put `access-key`, `secret-key`, and
/// `session-token` next to `region`. They are folded into a
/// [`CredentialConfig`] once, at load time.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FlatCredentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_type: Option<AuthType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
}

impl FlatCredentials {
    pub fn is_empty(&self) -> bool {
        self.auth_type.is_none()
            && self.access_key.is_none()
            && self.secret_key.is_none()
            && self.session_token.is_none()
    }
}

impl From<FlatCredentials> for CredentialConfig {
    fn from(flat: FlatCredentials) -> Self {
        let auth_type = flat.auth_type.unwrap_or(if flat.session_token.is_some() {
            AuthType::SessionToken
        } else if flat.access_key.is_some() || flat.secret_key.is_some() {
            AuthType::AccessKey
        } else {
            AuthType::None
        });

        Self {
            auth_type,
            access_key: flat.access_key,
            secret_key: flat.secret_key,
            session_token: flat.session_token,
            properties: HashMap::new(),
        }
    }
}

impl fmt::Debug for FlatCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlatCredentials")
            .field("auth_type", &self.auth_type)
            .field("access_key", &self.access_key)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "[REDACTED]"))
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

/// Transport-level retry settings handed to the remote client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RetryConfig {
    /// Retries after the first attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay between attempts in seconds
    #[serde(default = "default_delay_seconds")]
    pub delay_seconds: u64,

    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl RetryConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_seconds)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            delay_seconds: default_delay_seconds(),
            enabled: default_enabled(),
        }
    }
}

fn default_max_retries() -> u32 {
    3
}
fn default_delay_seconds() -> u64 {
    1
}
fn default_enabled() -> bool {
    true
}

/// Connection settings for one backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", try_from = "RawConnectionConfig")]
pub struct ConnectionConfig {
    /// Region the backend lives in
    pub region: String,

    /// Custom endpoint URL (local emulators, VPC endpoints)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    pub credentials: CredentialConfig,

    pub retry: RetryConfig,

    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub properties: HashMap<String, String>,
}

impl ConnectionConfig {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            endpoint: None,
            credentials: CredentialConfig::default(),
            retry: RetryConfig::default(),
            properties: HashMap::new(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_credentials(mut self, credentials: CredentialConfig) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Look up a free-form property, ignoring blank values
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// Check the connection invariants
    pub fn validate(&self) -> Result<()> {
        if self.region.trim().is_empty() {
            return Err(Error::invalid_config("region must not be empty"));
        }

        if let Some(endpoint) = &self.endpoint {
            if endpoint.trim().is_empty() {
                return Err(Error::invalid_config(
                    "endpoint must not be blank when specified",
                ));
            }
        }

        if self.retry.enabled && self.retry.max_retries == 0 {
            return Err(Error::invalid_config(
                "retry max-retries must be a positive integer when retry is enabled",
            ));
        }

        Ok(())
    }
}

/// Wire shape of a connection block, accepting legacy flat credentials
#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawConnectionConfig {
    #[serde(default)]
    region: String,
    #[serde(default)]
    endpoint: Option<String>,
    #[serde(default)]
    credentials: Option<CredentialConfig>,
    #[serde(default)]
    retry: RetryConfig,
    #[serde(default)]
    properties: HashMap<String, String>,
    #[serde(flatten)]
    legacy: FlatCredentials,
}

impl TryFrom<RawConnectionConfig> for ConnectionConfig {
    type Error = Error;

    fn try_from(raw: RawConnectionConfig) -> Result<Self> {
        let credentials = match (raw.credentials, raw.legacy.is_empty()) {
            (Some(_), false) => {
                return Err(Error::invalid_config(
                    "credentials are set both in the `credentials` block and as top-level fields",
                ))
            }
            (Some(credentials), true) => credentials,
            (None, false) => {
                tracing::debug!("Folding top-level credential fields into `credentials`");
                CredentialConfig::from(raw.legacy)
            }
            (None, true) => CredentialConfig::default(),
        };

        Ok(Self {
            region: raw.region,
            endpoint: raw.endpoint,
            credentials,
            retry: raw.retry,
            properties: raw.properties,
        })
    }
}
