//! The NameSystem: the unified publish/resolve API.
//!
//! Ties key identity, record validation, and the name store together into
//! the four external operations. The sequence check reads the previous
//! record and the subsequent write replaces it, so the read-validate-write
//! run of `publish` is serialized per key ID; publishes for different key
//! IDs proceed in parallel.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use base64::engine::general_purpose::STANDARD as BASE64_PAD;
use base64::Engine;
use bytes::Bytes;
use serde::Serialize;

use keypost_core::{validate_record, KeyId, Keypair, Record, RecordBuilder, ValidationError};
use keypost_store::NameStore;

use crate::error::{Error, Result};

/// A freshly generated keypair, as handed to the caller.
///
/// The private key is returned exactly once; the system keeps no copy.
#[derive(Debug, Clone, Serialize)]
pub struct KeypairHandle {
    /// Base36 textual key ID.
    pub id: String,
    /// Padded-base64 private key seed.
    #[serde(rename = "privateKey")]
    pub private_key: String,
}

/// The result of a successful resolve.
#[derive(Debug, Clone)]
pub struct Resolved {
    /// The target value the name currently points at.
    pub value: Bytes,
    /// The full record in its padded-base64 text form.
    pub record: String,
}

/// Generate a fresh keypair and its key ID.
///
/// The only operation in the system that creates key material.
pub fn create_keypair() -> KeypairHandle {
    let keypair = Keypair::generate();
    let id = KeyId::from_public_key(&keypair.public_key());
    KeypairHandle {
        id: id.to_string(),
        private_key: keypair.to_base64(),
    }
}

/// The name system: validated, monotonic name records over a store.
pub struct NameSystem<S: NameStore> {
    store: Arc<S>,
    /// Per-key-ID publish locks. Entries are created on demand and small
    /// (an Arc and a mutex), so the table is never pruned.
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl<S: NameStore> NameSystem<S> {
    /// Create a name system over the given store.
    pub fn new(store: S) -> Self {
        Self {
            store: Arc::new(store),
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Validate and persist a record for a key ID.
    ///
    /// The record text is padded base64 of the envelope bytes. Rejected
    /// records leave the store untouched.
    pub async fn publish(&self, key_text: &str, record_text: &str) -> Result<()> {
        let key = KeyId::parse(key_text)?;
        // Record-text decoding belongs to the codec: undecodable base64 is
        // the same malformed-record failure as undecodable envelope bytes.
        let raw = BASE64_PAD
            .decode(record_text)
            .map_err(|e| ValidationError::MalformedRecord(format!("invalid base64: {}", e)))?;

        let lock = self.lock_for(key_text);
        let _guard = lock.lock().await;

        let prev = self.store.get(&key).await?;
        if let Err(e) = validate_record(&key, &raw, prev.as_deref()) {
            tracing::debug!(key_id = %key_text, error = %e, "record rejected");
            return Err(e.into());
        }

        self.store.put(&key, &raw).await?;
        tracing::info!(key_id = %key_text, bytes = raw.len(), "record published");
        Ok(())
    }

    /// Resolve a key ID to its latest published record.
    ///
    /// Returns `Ok(None)` when no record exists: absence is a normal
    /// outcome, not an error. Expiry metadata is not enforced.
    pub async fn resolve(&self, key_text: &str) -> Result<Option<Resolved>> {
        let key = KeyId::parse(key_text)?;

        let raw = match self.store.get(&key).await? {
            Some(raw) => raw,
            None => return Ok(None),
        };

        let record = Record::from_bytes(&raw)
            .map_err(keypost_core::ValidationError::from)?;

        Ok(Some(Resolved {
            value: record.value,
            record: BASE64_PAD.encode(&raw),
        }))
    }

    /// Build and sign the next record for a target value, without
    /// persisting it. The caller decides whether and when to publish.
    ///
    /// The previously stored record (if any) supplies the prior sequence
    /// number; the private key must belong to the key ID.
    pub async fn create_record(
        &self,
        private_key_text: &str,
        key_text: &str,
        value: &[u8],
    ) -> Result<String> {
        let key = KeyId::parse(key_text)?;
        let keypair = Keypair::from_base64(private_key_text)
            .map_err(|_| Error::MalformedInput("invalid private key".into()))?;

        if keypair.public_key() != key.public_key() {
            return Err(Error::KeyMismatch);
        }

        let prev_raw = self.store.get(&key).await?;
        let prev = prev_raw
            .as_deref()
            .map(Record::from_bytes)
            .transpose()
            .map_err(keypost_core::ValidationError::from)?;

        let record = RecordBuilder::new(value.to_vec())
            .prev_opt(prev.as_ref())
            .sign(&keypair);

        tracing::debug!(key_id = %key_text, sequence = record.sequence, "record built");
        Ok(record.to_text())
    }

    fn lock_for(&self, key_text: &str) -> Arc<tokio::sync::Mutex<()>> {
        // A poisoned lock table is still usable: the guarded unit
        // mutexes carry no data to corrupt.
        let mut locks = match self.locks.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        locks
            .entry(key_text.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keypost_store::MemoryStore;

    #[test]
    fn test_create_keypair_shape() {
        let handle = create_keypair();
        assert!(handle.id.starts_with('k'));

        // The private key round-trips to the same key ID.
        let keypair = Keypair::from_base64(&handle.private_key).unwrap();
        let id = KeyId::from_public_key(&keypair.public_key());
        assert_eq!(id.to_string(), handle.id);
    }

    #[test]
    fn test_create_keypair_unique() {
        let a = create_keypair();
        let b = create_keypair();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn test_publish_bad_base64_is_malformed_record() {
        let system = NameSystem::new(MemoryStore::new());
        let handle = create_keypair();

        // Undecodable record text lands in the same taxonomy bucket as an
        // undecodable envelope.
        let result = system.publish(&handle.id, "!!not base64!!").await;
        assert!(matches!(
            result,
            Err(Error::Validation(ValidationError::MalformedRecord(_)))
        ));
    }

    #[tokio::test]
    async fn test_create_record_key_mismatch() {
        let system = NameSystem::new(MemoryStore::new());
        let alice = create_keypair();
        let bob = create_keypair();

        let result = system
            .create_record(&bob.private_key, &alice.id, b"/target/a")
            .await;
        assert!(matches!(result, Err(Error::KeyMismatch)));
    }

    #[tokio::test]
    async fn test_resolve_absent_is_none() {
        let system = NameSystem::new(MemoryStore::new());
        let handle = create_keypair();

        let resolved = system.resolve(&handle.id).await.unwrap();
        assert!(resolved.is_none());
    }
}
