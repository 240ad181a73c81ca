//! Backend capabilities consumed by the wallet services.
//!
//! The wallet never stores bytes or touches private keys itself. It talks
//! to two capabilities:
//!
//! - [`StorageBackend`] — a key/value store with a string tag index,
//!   addressed by `(type, id)`.
//! - [`CryptoBackend`] — sign and verify primitives addressed by opaque key
//!   references.
//!
//! Services receive them as `Arc<dyn ...>` so a single backend instance can
//! be shared by any number of services, and tests can substitute their own.
//!
//! # Modules
//!
//! - [`memory`] — in-process [`MemoryBackend`].
//! - [`file`] — one-JSON-file-per-record [`FileBackend`].

pub mod error;
pub mod file;
pub mod memory;

use async_trait::async_trait;

use crate::record::TagMap;

pub use error::{BackendError, BackendErrorKind, BackendResult};
pub use file::FileBackend;
pub use memory::MemoryBackend;

/// A record as the backend sees it: an id, an opaque value blob and tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    pub id: String,
    pub value: Vec<u8>,
    pub tags: TagMap,
}

/// Primitive record store with a tag index.
///
/// Each call is atomic with respect to the single record it addresses.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Insert a new record. Fails with `ItemAlreadyExists` if `(record_type, id)`
    /// is taken.
    async fn add_record(
        &self,
        record_type: &str,
        id: &str,
        value: &[u8],
        tags: &TagMap,
    ) -> BackendResult<()>;

    /// Replace value and tags of an existing record. Fails with `ItemNotFound`
    /// if absent.
    async fn update_record(
        &self,
        record_type: &str,
        id: &str,
        value: &[u8],
        tags: &TagMap,
    ) -> BackendResult<()>;

    /// Remove a record. Fails with `ItemNotFound` if absent.
    async fn delete_record(&self, record_type: &str, id: &str) -> BackendResult<()>;

    /// Fetch a record. Fails with `ItemNotFound` if absent.
    async fn get_record(&self, record_type: &str, id: &str) -> BackendResult<StoredRecord>;

    /// Return every record of `record_type` whose tags contain each
    /// key/value pair of `query`. An empty query matches all records.
    async fn find_records(
        &self,
        record_type: &str,
        query: &TagMap,
    ) -> BackendResult<Vec<StoredRecord>>;
}

/// Signing primitives over keys held by the backend.
#[async_trait]
pub trait CryptoBackend: Send + Sync {
    /// Sign `data` with the private key behind `key_ref`.
    async fn sign(&self, key_ref: &str, data: &[u8]) -> BackendResult<Vec<u8>>;

    /// Check `signature` over `data` against the public key `key_ref`.
    ///
    /// A well-formed but wrong signature yields `Ok(false)`.
    async fn verify(&self, key_ref: &str, data: &[u8], signature: &[u8]) -> BackendResult<bool>;
}

/// Conjunctive equality match of `query` against a record's `tags`.
pub fn matches_query(tags: &TagMap, query: &TagMap) -> bool {
    query
        .iter()
        .all(|(key, expected)| tags.get(key) == Some(expected))
}
