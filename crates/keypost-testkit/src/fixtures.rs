//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use keypost_core::{KeyId, Keypair, Record, RecordBuilder};
use keypost_store::MemoryStore;

/// A test fixture with a keypair and memory store.
pub struct TestFixture {
    pub keypair: Keypair,
    pub store: MemoryStore,
}

impl TestFixture {
    /// Create a new test fixture with a random keypair.
    pub fn new() -> Self {
        Self {
            keypair: Keypair::generate(),
            store: MemoryStore::new(),
        }
    }

    /// Create with a deterministic keypair from seed.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self {
            keypair: Keypair::from_seed(&seed),
            store: MemoryStore::new(),
        }
    }

    /// Derive the fixture's key ID.
    pub fn key_id(&self) -> KeyId {
        KeyId::from_public_key(&self.keypair.public_key())
    }

    /// The key ID in its base36 text form.
    pub fn key_text(&self) -> String {
        self.key_id().to_string()
    }

    /// Build and sign a first record for a target value.
    pub fn make_record(&self, value: &[u8]) -> Record {
        RecordBuilder::new(value.to_vec()).sign(&self.keypair)
    }

    /// Build and sign a successor record to `prev`.
    pub fn make_next(&self, prev: &Record, value: &[u8]) -> Record {
        RecordBuilder::new(value.to_vec())
            .prev(prev)
            .sign(&self.keypair)
    }

    /// Build a successor with the publisher's public key embedded.
    pub fn make_next_embedded(&self, prev: &Record, value: &[u8]) -> Record {
        RecordBuilder::new(value.to_vec())
            .prev(prev)
            .embed_public_key()
            .sign(&self.keypair)
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Create multiple test fixtures for multi-publisher tests.
pub fn multi_party_fixtures(count: usize) -> Vec<TestFixture> {
    (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[0] = i as u8;
            TestFixture::with_seed(seed)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use keypost_core::validate_record;
    use keypost_store::NameStore;

    #[test]
    fn test_fixture_record_chain() {
        let fixture = TestFixture::new();

        let r0 = fixture.make_record(b"/target/a");
        assert_eq!(r0.sequence, 0);

        let r1 = fixture.make_next(&r0, b"/target/b");
        assert_eq!(r1.sequence, 1);

        let r2 = fixture.make_next(&r1, b"/target/b");
        assert_eq!(r2.sequence, 1);
    }

    #[test]
    fn test_fixture_records_validate() {
        let fixture = TestFixture::with_seed([0x42; 32]);
        let key = fixture.key_id();

        let r0 = fixture.make_record(b"/target/a");
        validate_record(&key, &r0.to_bytes(), None).unwrap();

        let r1 = fixture.make_next_embedded(&r0, b"/target/b");
        validate_record(&key, &r1.to_bytes(), Some(&r0.to_bytes())).unwrap();
    }

    #[tokio::test]
    async fn test_fixture_store_roundtrip() {
        let fixture = TestFixture::new();
        let key = fixture.key_id();
        let record = fixture.make_record(b"/target/a");

        fixture.store.put(&key, &record.to_bytes()).await.unwrap();
        let raw = fixture.store.get(&key).await.unwrap().unwrap();
        assert_eq!(&raw[..], &record.to_bytes()[..]);
    }

    #[test]
    fn test_multi_party() {
        let parties = multi_party_fixtures(3);

        // Each party has a unique key ID.
        let ids: Vec<_> = parties.iter().map(|p| p.key_text()).collect();
        assert_ne!(ids[0], ids[1]);
        assert_ne!(ids[1], ids[2]);
        assert_ne!(ids[0], ids[2]);
    }
}
