//! Wire messages as ordered JSON objects.
//!
//! A [`Message`] always carries string `@type` and `@id` fields, kept at
//! the front. Field order is preserved by every operation, so a message
//! that is transformed and transformed back serializes to the same bytes.
//!
//! # Modules
//!
//! - [`signature`] — detached signatures over a single message field.

pub mod signature;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, WalletError};

pub use signature::{signature_key, SignatureDecorator, SignatureEnvelope, SIG_SPEC_CONST};

/// Message type field.
pub const TYPE_KEY: &str = "@type";
/// Message id field.
pub const ID_KEY: &str = "@id";

/// An ordered JSON object with mandatory `@type` and `@id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct Message(Map<String, Value>);

impl Message {
    pub fn new(message_type: impl Into<String>, id: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert(TYPE_KEY.to_string(), Value::String(message_type.into()));
        fields.insert(ID_KEY.to_string(), Value::String(id.into()));
        Self(fields)
    }

    /// New message with a random UUID v4 id.
    pub fn with_generated_id(message_type: impl Into<String>) -> Self {
        Self::new(message_type, generate_id())
    }

    /// Parse a JSON value. It must be an object with string `@type` and
    /// `@id` fields.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Self::try_from(fields),
            other => Err(WalletError::InvalidMessage(format!(
                "message must be a JSON object, got {other}"
            ))),
        }
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| WalletError::InvalidMessage(format!("invalid JSON: {e}")))?;
        Self::from_value(value)
    }

    pub fn message_type(&self) -> &str {
        self.0.get(TYPE_KEY).and_then(Value::as_str).unwrap_or_default()
    }

    pub fn id(&self) -> &str {
        self.0.get(ID_KEY).and_then(Value::as_str).unwrap_or_default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Field names in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Set a field. An existing field keeps its position; a new one is
    /// appended. `@type` and `@id` cannot be changed.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Result<Option<Value>> {
        let key = key.into();
        ensure_not_reserved(&key)?;
        Ok(self.0.insert(key, value))
    }

    /// Place `key` directly after `anchor`, moving it if already present.
    /// Appends when `anchor` does not exist. When `key` is `anchor` the
    /// value is replaced in place.
    pub fn insert_after(&mut self, anchor: &str, key: impl Into<String>, value: Value) -> Result<()> {
        let key = key.into();
        ensure_not_reserved(&key)?;
        if key == anchor {
            self.0.insert(key, value);
            return Ok(());
        }
        if !self.0.contains_key(anchor) {
            self.remove(&key);
            self.0.insert(key, value);
            return Ok(());
        }

        let old = std::mem::take(&mut self.0);
        let mut pending = Some((key.clone(), value));
        for (k, v) in old {
            if k == key {
                continue;
            }
            let is_anchor = k == anchor;
            self.0.insert(k, v);
            if is_anchor {
                if let Some((k, v)) = pending.take() {
                    self.0.insert(k, v);
                }
            }
        }
        Ok(())
    }

    /// Remove a field, keeping the order of the others. `@type` and `@id`
    /// are never removed.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        if is_reserved(key) || !self.0.contains_key(key) {
            return None;
        }
        let old = std::mem::take(&mut self.0);
        let mut removed = None;
        for (k, v) in old {
            if k == key {
                removed = Some(v);
            } else {
                self.0.insert(k, v);
            }
        }
        removed
    }

    /// Swap field `old_key` for `(new_key, value)` at the same position.
    ///
    /// Returns the previous value of `old_key`, or `None` (and leaves the
    /// message untouched) if it was absent.
    pub fn replace_key(
        &mut self,
        old_key: &str,
        new_key: impl Into<String>,
        value: Value,
    ) -> Result<Option<Value>> {
        let new_key = new_key.into();
        ensure_not_reserved(old_key)?;
        ensure_not_reserved(&new_key)?;
        if !self.0.contains_key(old_key) {
            return Ok(None);
        }

        let old = std::mem::take(&mut self.0);
        let mut pending = Some(value);
        let mut replaced = None;
        for (k, v) in old {
            if k == old_key {
                replaced = Some(v);
                if let Some(value) = pending.take() {
                    self.0.insert(new_key.clone(), value);
                }
            } else if k != new_key {
                self.0.insert(k, v);
            }
        }
        Ok(replaced)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Compact JSON bytes.
    pub fn to_vec(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(&self.0).map_err(|e| WalletError::SerializationError(e.to_string()))
    }
}

impl TryFrom<Map<String, Value>> for Message {
    type Error = WalletError;

    fn try_from(fields: Map<String, Value>) -> Result<Self> {
        let mut message_type = None;
        let mut id = None;
        let mut rest = Vec::with_capacity(fields.len());
        for (k, v) in fields {
            match k.as_str() {
                TYPE_KEY => message_type = Some(v),
                ID_KEY => id = Some(v),
                _ => rest.push((k, v)),
            }
        }

        let mut message = Message::new(
            expect_string(message_type, TYPE_KEY)?,
            expect_string(id, ID_KEY)?,
        );
        message.0.extend(rest);
        Ok(message)
    }
}

impl From<Message> for Map<String, Value> {
    fn from(message: Message) -> Self {
        message.0
    }
}

impl std::fmt::Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match serde_json::to_string(&self.0) {
            Ok(json) => f.write_str(&json),
            Err(_) => Err(std::fmt::Error),
        }
    }
}

/// A fresh message id.
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn is_reserved(key: &str) -> bool {
    key == TYPE_KEY || key == ID_KEY
}

fn ensure_not_reserved(key: &str) -> Result<()> {
    if is_reserved(key) {
        return Err(WalletError::InvalidMessage(format!(
            "'{key}' cannot be modified"
        )));
    }
    Ok(())
}

fn expect_string(value: Option<Value>, key: &str) -> Result<String> {
    match value {
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(WalletError::InvalidMessage(format!("'{key}' must be a string"))),
        None => Err(WalletError::InvalidMessage(format!("missing '{key}'"))),
    }
}
