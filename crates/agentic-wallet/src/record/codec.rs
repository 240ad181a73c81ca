//! Conversion between typed records and the backend's flat representation.

use serde_json::{Map, Value};

use super::{Record, RecordProps, RecordRegistry, TagMap};
use crate::backend::StoredRecord;
use crate::error::{Result, WalletError};

/// A record flattened for the backend: type tag, id, value blob, tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedRecord {
    pub record_type: String,
    pub id: String,
    /// UTF-8 JSON of every field except `id` and `tags`.
    pub value: Vec<u8>,
    pub tags: TagMap,
}

/// Encodes records to [`EncodedRecord`]s and decodes stored records back
/// through a [`RecordRegistry`].
#[derive(Debug, Clone)]
pub struct RecordCodec<T> {
    registry: RecordRegistry<T>,
}

impl<T: Record> RecordCodec<T> {
    pub fn new(registry: RecordRegistry<T>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &RecordRegistry<T> {
        &self.registry
    }

    /// Flatten `record` for storage.
    pub fn encode(&self, record: &T) -> Result<EncodedRecord> {
        let props = record.to_props()?;
        let value = serde_json::to_vec(&Value::Object(props.data))
            .map_err(|e| WalletError::SerializationError(e.to_string()))?;

        Ok(EncodedRecord {
            record_type: record.record_type().to_string(),
            id: record.id().to_string(),
            value,
            tags: record.tags(),
        })
    }

    /// Rebuild a typed record from what the backend returned for
    /// `record_type`.
    ///
    /// # Errors
    ///
    /// Returns `WalletError::Decode` if no factory is registered for
    /// `record_type` or the value blob is not a JSON object, and whatever
    /// the factory or [`Record::validate`] returns otherwise.
    pub fn decode(&self, record_type: &str, stored: StoredRecord) -> Result<T> {
        let factory = self
            .registry
            .get(record_type)
            .ok_or_else(|| WalletError::Decode {
                record_type: record_type.to_string(),
                reason: format!("{}: no factory registered for type tag", stored.id),
            })?;

        let data: Map<String, Value> =
            serde_json::from_slice(&stored.value).map_err(|e| WalletError::Decode {
                record_type: record_type.to_string(),
                reason: format!("{}: malformed value: {e}", stored.id),
            })?;

        let record = factory(RecordProps {
            record_type: record_type.to_string(),
            id: stored.id,
            tags: stored.tags,
            data,
        })?;
        record.validate()?;
        Ok(record)
    }
}
