//! Error types for AgenticWallet.
//!
//! All errors are strongly typed and propagated without panicking.
//! Key material is never included in error messages; only key
//! references (verkeys) may appear.
//!
//! Backends report failures as [`BackendError`]. The mapping functions at
//! the bottom of this module reclassify those into [`WalletError`] and are
//! the only place where backend conditions are interpreted.

use crate::backend::{BackendError, BackendErrorKind};
use crate::validation::ValidationError;

/// Wallet error types covering storage and signature operations.
#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    #[error("Record already exists: {record_type} {id}")]
    RecordDuplicate { record_type: String, id: String },

    #[error("Record not found: {record_type} {id}")]
    RecordNotFound { record_type: String, id: String },

    #[error("Signature verification failed for field '{field}'")]
    SignatureInvalid { field: String },

    #[error("Cannot decode {record_type} record: {reason}")]
    Decode { record_type: String, reason: String },

    #[error("Storage error ({context}): {source}")]
    Storage {
        context: String,
        #[source]
        source: BackendError,
    },

    #[error("Crypto error ({context}): {source}")]
    Crypto {
        context: String,
        #[source]
        source: BackendError,
    },

    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, WalletError>;

// ── Backend error mapping ─────────────────────────────────────────────────────

/// Reclassify a failure reported by a storage backend for record
/// `(record_type, id)`.
pub fn map_storage_error(err: BackendError, record_type: &str, id: &str) -> WalletError {
    match err.kind() {
        BackendErrorKind::ItemAlreadyExists => WalletError::RecordDuplicate {
            record_type: record_type.to_string(),
            id: id.to_string(),
        },
        BackendErrorKind::ItemNotFound => WalletError::RecordNotFound {
            record_type: record_type.to_string(),
            id: id.to_string(),
        },
        _ => WalletError::Storage {
            context: format!("{record_type} {id}"),
            source: err,
        },
    }
}

/// Reclassify a failure reported by a storage backend for a query that
/// does not address a single record.
pub fn map_query_error(err: BackendError, record_type: &str) -> WalletError {
    WalletError::Storage {
        context: format!("query {record_type}"),
        source: err,
    }
}

/// Reclassify a failure reported by a crypto backend while processing
/// message field `field`.
pub fn map_crypto_error(err: BackendError, field: &str) -> WalletError {
    match err.kind() {
        BackendErrorKind::VerificationFailed => WalletError::SignatureInvalid {
            field: field.to_string(),
        },
        _ => WalletError::Crypto {
            context: format!("field '{field}'"),
            source: err,
        },
    }
}
