//! Storage area abstraction
//!
//! A storage area is a flat key -> JSON document map. Every read returns the
//! full document and every write replaces it.

use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::Result;

pub trait StorageArea: Send + Sync {
    /// Read the document stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Replace the document stored under `key`.
    fn set(&self, key: &str, value: &Value) -> Result<()>;

    /// Remove the document stored under `key`. Missing keys are not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// Volatile storage area used for session-scoped state.
#[derive(Default)]
pub struct MemoryArea {
    entries: Arc<RwLock<HashMap<String, Value>>>,
}

impl MemoryArea {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every document, as happens when the browsing session ends.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Clone for MemoryArea {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl StorageArea for MemoryArea {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &Value) -> Result<()> {
        self.entries.write().insert(key.to_string(), value.clone());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().remove(key);
        Ok(())
    }
}
