//! The NameStore trait: the abstract interface for record persistence.
//!
//! Implementations include SQLite (primary) and in-memory (for tests).
//! The interface is a last-writer-wins map keyed by the key ID; callers
//! must validate before `put`.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use keypost_core::KeyId;

use crate::error::Result;

/// Async interface for the durable key ID → latest raw record mapping.
///
/// At most one record per key ID; `put` overwrites. The store never decodes
/// a record and never compares sequence numbers.
#[async_trait]
pub trait NameStore: Send + Sync {
    /// Fetch the latest raw record for a key ID, or `None` if absent.
    async fn get(&self, key: &KeyId) -> Result<Option<Bytes>>;

    /// Store the raw record for a key ID, replacing any previous entry.
    async fn put(&self, key: &KeyId, record: &[u8]) -> Result<()>;
}

#[async_trait]
impl<S: NameStore + ?Sized> NameStore for Arc<S> {
    async fn get(&self, key: &KeyId) -> Result<Option<Bytes>> {
        (**self).get(key).await
    }

    async fn put(&self, key: &KeyId, record: &[u8]) -> Result<()> {
        (**self).put(key, record).await
    }
}
