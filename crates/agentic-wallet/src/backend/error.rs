//! Failure signals reported by backends.

use std::fmt;

/// Condition a backend reports when an operation fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendErrorKind {
    /// An item with the same key is already present.
    ItemAlreadyExists,
    /// The addressed item does not exist.
    ItemNotFound,
    /// A signature was rejected by the verification primitive.
    VerificationFailed,
    /// A key reference could not be parsed or used.
    InvalidKey,
    /// Stored bytes could not be read back.
    InvalidData,
    /// Underlying I/O failed.
    Io,
    /// Anything else.
    Other,
}

impl BackendErrorKind {
    /// Return a stable string tag for diagnostics.
    pub fn as_tag(&self) -> &'static str {
        match self {
            Self::ItemAlreadyExists => "item_already_exists",
            Self::ItemNotFound => "item_not_found",
            Self::VerificationFailed => "verification_failed",
            Self::InvalidKey => "invalid_key",
            Self::InvalidData => "invalid_data",
            Self::Io => "io",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for BackendErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// Error returned by [`StorageBackend`](super::StorageBackend) and
/// [`CryptoBackend`](super::CryptoBackend) implementations.
#[derive(Debug, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct BackendError {
    kind: BackendErrorKind,
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl BackendError {
    /// Create an error with no underlying cause.
    pub fn new(kind: BackendErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create an error wrapping an underlying cause.
    pub fn with_source(
        kind: BackendErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::ItemAlreadyExists, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::ItemNotFound, message)
    }

    pub fn verification_failed(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::VerificationFailed, message)
    }

    pub fn invalid_key(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::InvalidKey, message)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Other, message)
    }

    pub fn io(err: std::io::Error) -> Self {
        let message = err.to_string();
        Self::with_source(BackendErrorKind::Io, message, err)
    }

    /// The reported condition.
    pub fn kind(&self) -> BackendErrorKind {
        self.kind
    }

    /// Human-readable detail supplied by the backend.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<std::io::Error> for BackendError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err)
    }
}

/// Convenience Result alias for backend calls.
pub type BackendResult<T> = std::result::Result<T, BackendError>;
