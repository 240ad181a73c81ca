//! A record of any type tag with a free-form payload.

use serde_json::{Map, Value};

use super::{Record, RecordProps, TagMap};
use crate::error::Result;

/// Untyped record: type tag, id, tags and a JSON object payload.
///
/// Useful for tooling that handles arbitrary record types, and as the
/// simplest possible [`Record`] implementation.
#[derive(Debug, Clone, PartialEq)]
pub struct GenericRecord {
    pub record_type: String,
    pub id: String,
    pub tags: TagMap,
    pub data: Map<String, Value>,
}

impl GenericRecord {
    pub fn new(record_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            record_type: record_type.into(),
            id: id.into(),
            tags: TagMap::new(),
            data: Map::new(),
        }
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn with_data(mut self, data: Map<String, Value>) -> Self {
        self.data = data;
        self
    }

    /// Factory accepting any type tag.
    pub fn from_props(props: RecordProps) -> Result<Self> {
        Ok(Self {
            record_type: props.record_type,
            id: props.id,
            tags: props.tags,
            data: props.data,
        })
    }
}

impl Record for GenericRecord {
    fn record_type(&self) -> &str {
        &self.record_type
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn tags(&self) -> TagMap {
        self.tags.clone()
    }

    fn to_props(&self) -> Result<RecordProps> {
        Ok(RecordProps {
            record_type: self.record_type.clone(),
            id: self.id.clone(),
            tags: self.tags.clone(),
            data: self.data.clone(),
        })
    }
}
