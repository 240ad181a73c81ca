//! Typed records and their flat storage representation.
//!
//! A record is addressed by `(type, id)`, carries a string tag map that the
//! backend indexes, and an opaque JSON payload. [`RecordCodec`] converts
//! between typed values and [`EncodedRecord`]s using a [`RecordRegistry`]
//! of factories keyed by type tag.

pub mod codec;
pub mod generic;
pub mod registry;

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Result, WalletError};

pub use codec::{EncodedRecord, RecordCodec};
pub use generic::GenericRecord;
pub use registry::{RecordFactory, RecordRegistry};

/// Flat string -> string tag map. Ordering carries no meaning.
pub type TagMap = BTreeMap<String, String>;

/// JSON key holding the record id when a record is viewed as an object.
pub const ID_KEY: &str = "id";
/// JSON key holding the tag map when a record is viewed as an object.
pub const TAGS_KEY: &str = "tags";

/// A domain object persisted through the storage service.
pub trait Record: Send + Sync {
    /// Type tag identifying the domain class this instance belongs to.
    fn record_type(&self) -> &str;

    /// Id, unique within [`record_type`](Record::record_type).
    fn id(&self) -> &str;

    /// Current tag map.
    fn tags(&self) -> TagMap;

    /// Everything except `id` and `tags`.
    fn to_props(&self) -> Result<RecordProps>;

    /// Checks run after a stored record has been decoded.
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// The properties handed to a [`RecordFactory`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordProps {
    pub record_type: String,
    pub id: String,
    pub tags: TagMap,
    pub data: Map<String, Value>,
}

impl RecordProps {
    /// Split a serializable record into id, tags and the remaining fields.
    ///
    /// The value must serialize to a JSON object with a string `id` field.
    /// A `tags` field, if present, must be a string -> string object.
    pub fn from_serializable<T: Serialize>(record_type: &str, record: &T) -> Result<Self> {
        let value = serde_json::to_value(record)
            .map_err(|e| WalletError::SerializationError(e.to_string()))?;
        let Value::Object(mut data) = value else {
            return Err(WalletError::SerializationError(format!(
                "{record_type} record must serialize to a JSON object"
            )));
        };

        let id = match data.remove(ID_KEY) {
            Some(Value::String(id)) => id,
            _ => {
                return Err(WalletError::SerializationError(format!(
                    "{record_type} record must have a string '{ID_KEY}'"
                )))
            }
        };

        let tags = match data.remove(TAGS_KEY) {
            None | Some(Value::Null) => TagMap::new(),
            Some(tags) => serde_json::from_value(tags).map_err(|e| {
                WalletError::SerializationError(format!("{record_type} {id} tags: {e}"))
            })?,
        };

        Ok(Self {
            record_type: record_type.to_string(),
            id,
            tags,
            data,
        })
    }

    /// Merge id and tags back into the payload and deserialize into `T`.
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<T> {
        let RecordProps {
            record_type,
            id,
            tags,
            mut data,
        } = self;

        let tags_value = serde_json::to_value(&tags)
            .map_err(|e| WalletError::SerializationError(e.to_string()))?;
        data.insert(ID_KEY.to_string(), Value::String(id.clone()));
        data.insert(TAGS_KEY.to_string(), tags_value);

        serde_json::from_value(Value::Object(data)).map_err(|e| WalletError::Decode {
            record_type,
            reason: format!("{id}: {e}"),
        })
    }
}
