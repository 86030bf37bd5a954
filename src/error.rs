//! Error types for the reputation client.

use thiserror::Error;

/// Invalid or missing client configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required field was absent or empty.
    #[error("missing required config field: {field}")]
    Missing { field: &'static str },

    /// A field was present but failed its constraint.
    #[error("invalid config field {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    /// Config file could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Config file could not be parsed.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

impl ConfigError {
    /// Name of the offending field, if the error is about a single field.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ConfigError::Missing { field } | ConfigError::Invalid { field, .. } => Some(*field),
            ConfigError::Io(_) | ConfigError::Parse(_) => None,
        }
    }
}

/// Failure to produce a Hawk authorization header.
#[derive(Debug, Error)]
pub enum SigningError {
    /// The credentials name a hash algorithm Hawk signing does not support.
    #[error("unsupported hash algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// The request URL lacks a component the MAC covers.
    #[error("cannot sign request URL: {0}")]
    InvalidUrl(String),

    /// The computed header contains bytes HTTP headers cannot carry.
    #[error("invalid authorization header: {0}")]
    InvalidHeader(String),
}

/// Category of a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// No response headers within the configured timeout.
    Timeout,
    /// Connection refused, unreachable, or DNS failure.
    Connect,
    /// Any other failure while sending the request.
    Request,
    /// Headers arrived but the body could not be read.
    Body,
}

impl TransportErrorKind {
    /// Stable code string for this category.
    pub fn code(&self) -> &'static str {
        match self {
            TransportErrorKind::Timeout => "timeout",
            TransportErrorKind::Connect => "connect",
            TransportErrorKind::Request => "request",
            TransportErrorKind::Body => "body",
        }
    }
}

/// The request never produced an HTTP response.
#[derive(Debug, Error)]
#[error("transport error ({}): {message}", .kind.code())]
pub struct TransportError {
    kind: TransportErrorKind,
    message: String,
}

impl TransportError {
    /// Create a transport error of the given kind.
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Timeout waiting for response headers.
    pub fn timeout(after_ms: u64) -> Self {
        Self::new(
            TransportErrorKind::Timeout,
            format!("no response headers within {}ms", after_ms),
        )
    }

    pub fn kind(&self) -> TransportErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_timeout(&self) -> bool {
        self.kind == TransportErrorKind::Timeout
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        let kind = if e.is_timeout() {
            TransportErrorKind::Timeout
        } else if e.is_connect() {
            TransportErrorKind::Connect
        } else if e.is_body() || e.is_decode() {
            TransportErrorKind::Body
        } else {
            TransportErrorKind::Request
        };
        TransportError::new(kind, e.to_string())
    }
}

/// Any failure surfaced by a client operation.
///
/// HTTP error statuses are not represented here; they arrive as ordinary
/// [`OperationResult`](crate::OperationResult)s.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An operation argument was rejected before any I/O.
    #[error("invalid argument {field}: {reason}")]
    InvalidArgument { field: &'static str, reason: String },

    #[error(transparent)]
    Signing(#[from] SigningError),

    /// Request body could not be serialized.
    #[error("failed to serialize request body: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl ClientError {
    pub(crate) fn invalid_argument(field: &'static str, reason: impl Into<String>) -> Self {
        ClientError::InvalidArgument {
            field,
            reason: reason.into(),
        }
    }

    /// The transport error, if this failure happened on the wire.
    pub fn as_transport(&self) -> Option<&TransportError> {
        match self {
            ClientError::Transport(e) => Some(e),
            _ => None,
        }
    }
}

/// Result alias for client operations.
pub type Result<T, E = ClientError> = std::result::Result<T, E>;
