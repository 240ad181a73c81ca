//! AgenticWallet — record storage and message integrity for identity agents.
//!
//! Provides a tagged record storage service that keeps typed domain
//! objects in a primitive key/value + tag backend, and a detached
//! signature envelope that turns one message field into a verifiable
//! signature block and back. Backends are pluggable capabilities; an
//! in-memory store, a filesystem store and an Ed25519 key store are
//! included.

pub mod backend;
pub mod config;
pub mod crypto;
pub mod error;
pub mod message;
pub mod protocols;
pub mod record;
pub mod storage;
pub mod time;
pub mod validation;

// Re-export primary types
pub use backend::{
    BackendError, BackendErrorKind, CryptoBackend, FileBackend, MemoryBackend, StorageBackend,
    StoredRecord,
};
pub use config::WalletConfig;
pub use crypto::{KeyStore, Verkey};
pub use error::{Result, WalletError};
pub use message::{Message, SignatureDecorator, SignatureEnvelope, SIG_SPEC_CONST};
pub use record::{GenericRecord, Record, RecordCodec, RecordProps, RecordRegistry, TagMap};
pub use storage::StorageService;
pub use validation::{Validation, ValidationError};
