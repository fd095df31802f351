//! Security utilities for secret handling
//!
//! Provides:
//! - SecureString with zeroize
//! - Access audit records (never carry secret values)

use secretgate_core::BackendKind;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A secure string that is automatically zeroed on drop
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecureString {
    inner: String,
}

impl SecureString {
    /// Create a new secure string
    pub fn new(value: String) -> Self {
        Self { inner: value }
    }

    /// Get the string value (use with caution)
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl From<String> for SecureString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecureString {
    fn from(s: &str) -> Self {
        Self::new(s.to_string())
    }
}

impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecureString([REDACTED {} bytes])", self.len())
    }
}

impl fmt::Display for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

/// Where a returned value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueOrigin {
    Cache,
    Remote,
}

impl fmt::Display for ValueOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueOrigin::Cache => write!(f, "cache"),
            ValueOrigin::Remote => write!(f, "remote"),
        }
    }
}

/// Audit record for one secret lookup
#[derive(Debug, Clone)]
pub struct AuditLog {
    pub backend: BackendKind,
    pub key: String,
    pub origin: Option<ValueOrigin>,
    pub error: Option<String>,
    pub timestamp: std::time::SystemTime,
}

impl AuditLog {
    pub fn new(backend: BackendKind, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
            origin: None,
            error: None,
            timestamp: std::time::SystemTime::now(),
        }
    }

    pub fn served_from(mut self, origin: ValueOrigin) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Emit the record (never logs secret values)
    pub fn log(&self) {
        match (&self.error, self.origin) {
            (None, Some(ValueOrigin::Cache)) => tracing::debug!(
                backend = %self.backend,
                key = %self.key,
                "Secret served from cache"
            ),
            (None, _) => tracing::info!(
                backend = %self.backend,
                key = %self.key,
                timestamp = ?self.timestamp,
                "Secret fetched from backend"
            ),
            (Some(error), _) => tracing::warn!(
                backend = %self.backend,
                key = %self.key,
                error = %error,
                timestamp = ?self.timestamp,
                "Secret lookup failed"
            ),
        }
    }
}
