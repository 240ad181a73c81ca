//! In-process storage backend.
//!
//! Records live in a `HashMap` keyed by `(type, id)` behind a
//! `tokio::sync::RwLock`. Nothing is persisted; dropping the backend drops
//! every record.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{matches_query, BackendError, BackendResult, StorageBackend, StoredRecord};
use crate::record::TagMap;

#[derive(Debug, Clone)]
struct Entry {
    value: Vec<u8>,
    tags: TagMap,
}

/// In-memory [`StorageBackend`].
#[derive(Debug, Default)]
pub struct MemoryBackend {
    records: RwLock<HashMap<(String, String), Entry>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently held, across all types.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

fn key(record_type: &str, id: &str) -> (String, String) {
    (record_type.to_string(), id.to_string())
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn add_record(
        &self,
        record_type: &str,
        id: &str,
        value: &[u8],
        tags: &TagMap,
    ) -> BackendResult<()> {
        let mut records = self.records.write().await;
        let key = key(record_type, id);
        if records.contains_key(&key) {
            return Err(BackendError::already_exists(format!("{record_type}/{id}")));
        }
        records.insert(
            key,
            Entry {
                value: value.to_vec(),
                tags: tags.clone(),
            },
        );
        Ok(())
    }

    async fn update_record(
        &self,
        record_type: &str,
        id: &str,
        value: &[u8],
        tags: &TagMap,
    ) -> BackendResult<()> {
        let mut records = self.records.write().await;
        match records.get_mut(&key(record_type, id)) {
            Some(entry) => {
                *entry = Entry {
                    value: value.to_vec(),
                    tags: tags.clone(),
                };
                Ok(())
            }
            None => Err(BackendError::not_found(format!("{record_type}/{id}"))),
        }
    }

    async fn delete_record(&self, record_type: &str, id: &str) -> BackendResult<()> {
        let mut records = self.records.write().await;
        records
            .remove(&key(record_type, id))
            .map(|_| ())
            .ok_or_else(|| BackendError::not_found(format!("{record_type}/{id}")))
    }

    async fn get_record(&self, record_type: &str, id: &str) -> BackendResult<StoredRecord> {
        let records = self.records.read().await;
        records
            .get(&key(record_type, id))
            .map(|entry| StoredRecord {
                id: id.to_string(),
                value: entry.value.clone(),
                tags: entry.tags.clone(),
            })
            .ok_or_else(|| BackendError::not_found(format!("{record_type}/{id}")))
    }

    async fn find_records(
        &self,
        record_type: &str,
        query: &TagMap,
    ) -> BackendResult<Vec<StoredRecord>> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|((t, _), entry)| t == record_type && matches_query(&entry.tags, query))
            .map(|((_, id), entry)| StoredRecord {
                id: id.clone(),
                value: entry.value.clone(),
                tags: entry.tags.clone(),
            })
            .collect())
    }
}
