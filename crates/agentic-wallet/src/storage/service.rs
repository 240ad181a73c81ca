//! CRUD and tag queries over typed records.

use std::sync::Arc;

use log::debug;

use crate::backend::StorageBackend;
use crate::error::{map_query_error, map_storage_error, Result};
use crate::record::{Record, RecordCodec, RecordRegistry, TagMap};

/// Storage service for records of family `T`.
///
/// The service owns no data. It encodes records with a [`RecordCodec`] and
/// forwards them to a shared [`StorageBackend`]. Every call addresses at
/// most one record, except the read-only queries; sequences of calls are
/// not transactional.
pub struct StorageService<T> {
    backend: Arc<dyn StorageBackend>,
    codec: RecordCodec<T>,
}

impl<T: Record> StorageService<T> {
    /// Create a service decoding through `registry`.
    pub fn new(backend: Arc<dyn StorageBackend>, registry: RecordRegistry<T>) -> Self {
        Self {
            backend,
            codec: RecordCodec::new(registry),
        }
    }

    pub fn codec(&self) -> &RecordCodec<T> {
        &self.codec
    }

    /// Persist a new record.
    ///
    /// # Errors
    ///
    /// Returns `WalletError::RecordDuplicate` if a record with the same type
    /// and id already exists.
    pub async fn save(&self, record: &T) -> Result<()> {
        let encoded = self.codec.encode(record)?;
        debug!("save {} {}", encoded.record_type, encoded.id);
        self.backend
            .add_record(
                &encoded.record_type,
                &encoded.id,
                &encoded.value,
                &encoded.tags,
            )
            .await
            .map_err(|e| map_storage_error(e, &encoded.record_type, &encoded.id))
    }

    /// Replace value and tags of an existing record.
    ///
    /// # Errors
    ///
    /// Returns `WalletError::RecordNotFound` if the record does not exist.
    pub async fn update(&self, record: &T) -> Result<()> {
        let encoded = self.codec.encode(record)?;
        debug!("update {} {}", encoded.record_type, encoded.id);
        self.backend
            .update_record(
                &encoded.record_type,
                &encoded.id,
                &encoded.value,
                &encoded.tags,
            )
            .await
            .map_err(|e| map_storage_error(e, &encoded.record_type, &encoded.id))
    }

    /// Remove a record.
    ///
    /// # Errors
    ///
    /// Returns `WalletError::RecordNotFound` if the record does not exist.
    /// Callers wanting idempotent deletes match on that variant themselves.
    pub async fn delete(&self, record: &T) -> Result<()> {
        let (record_type, id) = (record.record_type(), record.id());
        debug!("delete {record_type} {id}");
        self.backend
            .delete_record(record_type, id)
            .await
            .map_err(|e| map_storage_error(e, record_type, id))
    }

    /// Load a record by type tag and id.
    ///
    /// # Errors
    ///
    /// Returns `WalletError::RecordNotFound` if absent and
    /// `WalletError::Decode` if the stored record cannot be decoded.
    pub async fn get_by_id(&self, record_type: &str, id: &str) -> Result<T> {
        debug!("get {record_type} {id}");
        let stored = self
            .backend
            .get_record(record_type, id)
            .await
            .map_err(|e| map_storage_error(e, record_type, id))?;
        self.codec.decode(record_type, stored)
    }

    /// Every record of `record_type`. Order is backend-defined.
    pub async fn get_all(&self, record_type: &str) -> Result<Vec<T>> {
        self.find_by_query(record_type, &TagMap::new()).await
    }

    /// Records of `record_type` whose tags contain every pair in `query`.
    ///
    /// Matching is exact and conjunctive. Tags not named in `query` are
    /// ignored. Order is backend-defined.
    pub async fn find_by_query(&self, record_type: &str, query: &TagMap) -> Result<Vec<T>> {
        debug!("find {record_type} {query:?}");
        let stored = self
            .backend
            .find_records(record_type, query)
            .await
            .map_err(|e| map_query_error(e, record_type))?;

        stored
            .into_iter()
            .map(|s| self.codec.decode(record_type, s))
            .collect()
    }
}
