//! Type tag -> factory registry used to decode stored records.

use std::collections::HashMap;
use std::fmt;

use super::RecordProps;
use crate::error::Result;

/// Constructor for a concrete record variant.
pub type RecordFactory<T> = fn(RecordProps) -> Result<T>;

/// Maps type tags to the factories that build `T` from stored properties.
///
/// `T` is either a single record struct, registered under its one tag, or
/// an enum over several record types with one factory per variant.
pub struct RecordRegistry<T> {
    factories: HashMap<String, RecordFactory<T>>,
}

impl<T> RecordRegistry<T> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register `factory` for `record_type`, replacing any earlier one.
    pub fn register(mut self, record_type: impl Into<String>, factory: RecordFactory<T>) -> Self {
        self.insert(record_type, factory);
        self
    }

    /// In-place form of [`register`](Self::register).
    pub fn insert(&mut self, record_type: impl Into<String>, factory: RecordFactory<T>) {
        self.factories.insert(record_type.into(), factory);
    }

    pub fn get(&self, record_type: &str) -> Option<RecordFactory<T>> {
        self.factories.get(record_type).copied()
    }

    pub fn contains(&self, record_type: &str) -> bool {
        self.factories.contains_key(record_type)
    }

    /// Registered type tags, in no particular order.
    pub fn record_types(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}

impl<T> Default for RecordRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for RecordRegistry<T> {
    fn clone(&self) -> Self {
        Self {
            factories: self.factories.clone(),
        }
    }
}

impl<T> fmt::Debug for RecordRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordRegistry")
            .field("record_types", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}
