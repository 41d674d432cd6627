//! In-memory implementation of the NameStore trait.
//!
//! Primarily for testing. Same overwrite semantics as SQLite, no
//! persistence.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use bytes::Bytes;
use keypost_core::KeyId;

use crate::error::Result;
use crate::traits::NameStore;

/// In-memory store. Thread-safe via RwLock; all data is lost on drop.
pub struct MemoryStore {
    records: RwLock<HashMap<String, Bytes>>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored names.
    pub fn len(&self) -> usize {
        self.records.read().unwrap().len()
    }

    /// Whether the store holds no names.
    pub fn is_empty(&self) -> bool {
        self.records.read().unwrap().is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NameStore for MemoryStore {
    async fn get(&self, key: &KeyId) -> Result<Option<Bytes>> {
        let records = self.records.read().unwrap();
        Ok(records.get(&key.to_string()).cloned())
    }

    async fn put(&self, key: &KeyId, record: &[u8]) -> Result<()> {
        let mut records = self.records.write().unwrap();
        records.insert(key.to_string(), Bytes::copy_from_slice(record));
        Ok(())
    }
}
