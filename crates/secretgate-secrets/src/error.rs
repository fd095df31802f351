//! Backend-agnostic error types surfaced to callers
//!
//! Every remote failure is translated into a [`DomainError`] before it leaves
//! this crate, so callers match on [`ErrorKind`] and never on SDK types.

use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Result type for secret lookups
pub type Result<T> = std::result::Result<T, SecretsError>;

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Stable classification of backend failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    AccessDenied,
    Authentication,
    Configuration,
    Unavailable,
    Timeout,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not found",
            ErrorKind::AccessDenied => "access denied",
            ErrorKind::Authentication => "authentication failed",
            ErrorKind::Configuration => "configuration error",
            ErrorKind::Unavailable => "backend unavailable",
            ErrorKind::Timeout => "timed out",
            ErrorKind::Internal => "internal error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified failure, optionally tied to the key being looked up
///
/// The original backend error is kept as [`StdError::source`] for
/// diagnostics.
#[derive(Debug)]
pub struct DomainError {
    kind: ErrorKind,
    key: Option<String>,
    message: String,
    source: Option<BoxError>,
}

impl DomainError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            key: None,
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Downcast the wrapped cause
    pub fn cause<T: StdError + 'static>(&self) -> Option<&T> {
        self.source.as_deref().and_then(|s| s.downcast_ref::<T>())
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) => write!(f, "{} for '{}': {}", self.kind, key, self.message),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

impl StdError for DomainError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|s| s as &(dyn StdError + 'static))
    }
}

impl From<secretgate_core::Error> for DomainError {
    fn from(err: secretgate_core::Error) -> Self {
        DomainError::configuration(err.to_string()).with_source(err)
    }
}

/// Errors returned by a secret lookup
#[derive(Error, Debug)]
pub enum SecretsError {
    /// The caller passed an unusable key; raised before any cache or network access
    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    /// The caller cancelled the lookup before the backend answered
    #[error("Lookup of '{key}' was cancelled")]
    Cancelled { key: String },

    /// A classified backend or configuration failure
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl SecretsError {
    /// Create an invalid argument error
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// Classification, when the error came from a backend or configuration
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            SecretsError::Domain(err) => Some(err.kind()),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, SecretsError::Cancelled { .. })
    }

    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            SecretsError::Domain(err) => Some(err),
            _ => None,
        }
    }
}
