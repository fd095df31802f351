//! Translation of backend-native failures into [`ErrorKind`]s
//!
//! Remote clients describe a failure as a [`RemoteFault`]: the service error
//! code, the HTTP status, and any transport-level condition, with the SDK
//! error attached as its source. [`translate`] classifies the fault with the
//! table for its backend kind and wraps it in a [`DomainError`].
//!
//! Classification order: service error code, then transport condition, then
//! HTTP status. Anything left over is [`ErrorKind::Internal`].

use crate::error::{DomainError, ErrorKind};
use secretgate_core::BackendKind;
use std::error::Error as StdError;
use std::fmt;

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Failure below the HTTP layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportFailure {
    /// The request or a connection attempt timed out
    Timeout,
    /// The backend could not be reached
    Unreachable,
}

/// A backend-native failure reported by a remote client
#[derive(Debug)]
pub struct RemoteFault {
    pub backend: BackendKind,
    /// Service error code, e.g. `ParameterNotFound`
    pub code: Option<String>,
    /// HTTP status of the response, if one was received
    pub status: Option<u16>,
    pub transport: Option<TransportFailure>,
    pub message: String,
    source: Option<BoxError>,
}

impl RemoteFault {
    pub fn new(backend: BackendKind, message: impl Into<String>) -> Self {
        Self {
            backend,
            code: None,
            status: None,
            transport: None,
            message: message.into(),
            source: None,
        }
    }

    /// A service error identified by its error code
    pub fn service(backend: BackendKind, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(backend, message).with_code(code)
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_transport(mut self, transport: TransportFailure) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl fmt::Display for RemoteFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} request failed", self.backend)?;
        if let Some(code) = &self.code {
            write!(f, " ({})", code)?;
        }
        if let Some(status) = self.status {
            write!(f, " [HTTP {}]", status)?;
        }
        write!(f, ": {}", self.message)
    }
}

impl StdError for RemoteFault {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|s| s as &(dyn StdError + 'static))
    }
}

const PARAMETER_STORE_CODES: &[(&str, ErrorKind)] = &[
    ("ParameterNotFound", ErrorKind::NotFound),
    ("ParameterVersionNotFound", ErrorKind::NotFound),
    ("ThrottlingException", ErrorKind::Unavailable),
];

const SECRETS_MANAGER_CODES: &[(&str, ErrorKind)] = &[
    ("ResourceNotFoundException", ErrorKind::NotFound),
    ("InvalidParameterException", ErrorKind::Configuration),
    ("InvalidRequestException", ErrorKind::Configuration),
    ("DecryptionFailure", ErrorKind::AccessDenied),
    ("InternalServiceError", ErrorKind::Internal),
    ("ThrottlingException", ErrorKind::Unavailable),
];

/// Codes every AWS service can return
const COMMON_CODES: &[(&str, ErrorKind)] = &[
    ("AccessDeniedException", ErrorKind::AccessDenied),
    ("UnrecognizedClientException", ErrorKind::Authentication),
    ("InvalidSignatureException", ErrorKind::Authentication),
    ("InvalidClientTokenId", ErrorKind::Authentication),
    ("ExpiredTokenException", ErrorKind::Authentication),
];

const STATUS_CODES: &[(u16, ErrorKind)] = &[
    (401, ErrorKind::Authentication),
    (403, ErrorKind::AccessDenied),
    (408, ErrorKind::Timeout),
    (429, ErrorKind::Unavailable),
    (503, ErrorKind::Unavailable),
    (504, ErrorKind::Timeout),
];

fn code_table(backend: BackendKind) -> &'static [(&'static str, ErrorKind)] {
    match backend {
        BackendKind::ParameterStore => PARAMETER_STORE_CODES,
        BackendKind::SecretsManager => SECRETS_MANAGER_CODES,
    }
}

/// Classify a fault without consuming it
pub fn classify(fault: &RemoteFault) -> ErrorKind {
    if let Some(code) = fault.code.as_deref() {
        let by_code = code_table(fault.backend)
            .iter()
            .chain(COMMON_CODES)
            .find(|(known, _)| *known == code)
            .map(|(_, kind)| *kind);
        if let Some(kind) = by_code {
            return kind;
        }
    }

    match fault.transport {
        Some(TransportFailure::Timeout) => return ErrorKind::Timeout,
        Some(TransportFailure::Unreachable) => return ErrorKind::Unavailable,
        None => {}
    }

    fault
        .status
        .and_then(|status| {
            STATUS_CODES
                .iter()
                .find(|(known, _)| *known == status)
                .map(|(_, kind)| *kind)
        })
        .unwrap_or(ErrorKind::Internal)
}

/// Wrap a fault into a [`DomainError`] for the key that was requested
pub fn translate(fault: RemoteFault, key: &str) -> DomainError {
    let kind = classify(&fault);
    let message = match kind {
        ErrorKind::NotFound => format!("no value stored in {}", fault.backend),
        _ => fault.to_string(),
    };
    DomainError::new(kind, message)
        .with_key(key)
        .with_source(fault)
}
