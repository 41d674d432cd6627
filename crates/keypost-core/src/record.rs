//! The name record: a signed, immutable pointer from a key ID to a target.
//!
//! A record is never edited. A newer pointer is a new record with a strictly
//! greater sequence number; republishing an unchanged target carries the
//! sequence forward instead of consuming a new one.

use base64::engine::general_purpose::STANDARD as BASE64_PAD;
use base64::Engine;
use bytes::Bytes;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::canonical::{decode_record, encode_record, signed_message};
use crate::crypto::{Keypair, PublicKey, Signature};
use crate::error::CoreError;

/// Validity window stamped on a freshly built record: one hour, measured
/// from construction time. Expiry is metadata for downstream consumers;
/// this crate populates it and never enforces it.
pub const RECORD_LIFETIME_MS: i64 = 60 * 60 * 1000;

/// A signed name record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// The opaque target value this name points at.
    pub value: Bytes,

    /// Monotonic update counter. A publisher bumping this once per
    /// millisecond would need roughly 585 million years to wrap a u64,
    /// so overflow is treated as unreachable rather than special-cased.
    pub sequence: u64,

    /// Expiry timestamp (Unix milliseconds). Not enforced here.
    pub expires_at: i64,

    /// Optional embedded copy of the publisher's public key. When present
    /// it must agree with the key recoverable from the key ID.
    pub public_key: Option<PublicKey>,

    /// Ed25519 signature over the canonical encoding of the fields above.
    pub signature: Signature,
}

impl Record {
    /// The bytes this record's signature covers.
    pub fn signed_message(&self) -> Vec<u8> {
        signed_message(
            &self.value,
            self.sequence,
            self.expires_at,
            self.public_key.as_ref(),
        )
    }

    /// Encode to envelope bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        encode_record(self)
    }

    /// Decode from envelope bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CoreError> {
        decode_record(bytes)
    }

    /// Encode to the padded-base64 text form used on the external interface.
    pub fn to_text(&self) -> String {
        BASE64_PAD.encode(self.to_bytes())
    }

    /// Decode from padded-base64 text.
    pub fn from_text(text: &str) -> Result<Self, CoreError> {
        let bytes = BASE64_PAD
            .decode(text)
            .map_err(|e| CoreError::MalformedRecord(format!("invalid base64: {}", e)))?;
        Self::from_bytes(&bytes)
    }
}

/// Builds and signs the next record for a target value.
///
/// Pure function of its inputs: the caller hands it the previous record (if
/// any); it never consults storage. The sequence rule:
///
/// - no previous record: sequence 0
/// - previous target byte-equal to the new one: sequence carried forward
/// - otherwise: previous sequence + 1
pub struct RecordBuilder {
    value: Bytes,
    prev: Option<(Bytes, u64)>,
    expires_at: Option<i64>,
    embed_public_key: bool,
}

impl RecordBuilder {
    /// Start building a record for a target value.
    pub fn new(value: impl Into<Bytes>) -> Self {
        Self {
            value: value.into(),
            prev: None,
            expires_at: None,
            embed_public_key: false,
        }
    }

    /// Supply the previously stored record, which determines the sequence.
    pub fn prev(mut self, prev: &Record) -> Self {
        self.prev = Some((prev.value.clone(), prev.sequence));
        self
    }

    /// Supply the previous record only if one exists.
    pub fn prev_opt(mut self, prev: Option<&Record>) -> Self {
        self.prev = prev.map(|p| (p.value.clone(), p.sequence));
        self
    }

    /// Override the expiry timestamp. Defaults to now + [`RECORD_LIFETIME_MS`].
    pub fn expires_at(mut self, ts: i64) -> Self {
        self.expires_at = Some(ts);
        self
    }

    /// Embed the signer's public key in the envelope.
    pub fn embed_public_key(mut self) -> Self {
        self.embed_public_key = true;
        self
    }

    /// Compute the sequence, sign, and return the finished record.
    pub fn sign(self, keypair: &Keypair) -> Record {
        let sequence = match &self.prev {
            None => 0,
            Some((prev_value, prev_seq)) if *prev_value == self.value => *prev_seq,
            Some((_, prev_seq)) => prev_seq.saturating_add(1),
        };

        let expires_at = self
            .expires_at
            .unwrap_or_else(|| now_millis() + RECORD_LIFETIME_MS);

        let public_key = self.embed_public_key.then(|| keypair.public_key());

        let message = signed_message(&self.value, sequence, expires_at, public_key.as_ref());
        let signature = keypair.sign(&message);

        Record {
            value: self.value,
            sequence,
            expires_at,
            public_key,
            signature,
        }
    }
}

/// Current time in Unix milliseconds.
fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_millis() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_record_has_sequence_zero() {
        let keypair = Keypair::generate();
        let record = RecordBuilder::new(b"/target/a".to_vec()).sign(&keypair);
        assert_eq!(record.sequence, 0);
    }

    #[test]
    fn test_unchanged_value_keeps_sequence() {
        let keypair = Keypair::generate();
        let r0 = RecordBuilder::new(b"/target/a".to_vec()).sign(&keypair);

        let r1 = RecordBuilder::new(b"/target/a".to_vec())
            .prev(&r0)
            .sign(&keypair);
        assert_eq!(r1.sequence, 0);

        // And again: still no new sequence consumed.
        let r2 = RecordBuilder::new(b"/target/a".to_vec())
            .prev(&r1)
            .sign(&keypair);
        assert_eq!(r2.sequence, 0);
    }

    #[test]
    fn test_changed_value_increments_sequence() {
        let keypair = Keypair::generate();
        let r0 = RecordBuilder::new(b"/target/a".to_vec()).sign(&keypair);

        let r1 = RecordBuilder::new(b"/target/b".to_vec())
            .prev(&r0)
            .sign(&keypair);
        assert_eq!(r1.sequence, 1);

        let r2 = RecordBuilder::new(b"/target/c".to_vec())
            .prev(&r1)
            .sign(&keypair);
        assert_eq!(r2.sequence, 2);
    }

    #[test]
    fn test_signature_covers_signed_message() {
        let keypair = Keypair::generate();
        let record = RecordBuilder::new(b"/target/a".to_vec()).sign(&keypair);

        keypair
            .public_key()
            .verify(&record.signed_message(), &record.signature)
            .expect("builder output should verify");
    }

    #[test]
    fn test_default_expiry_in_the_future() {
        let keypair = Keypair::generate();
        let before = now_millis();
        let record = RecordBuilder::new(b"/target/a".to_vec()).sign(&keypair);
        assert!(record.expires_at >= before + RECORD_LIFETIME_MS);
    }

    #[test]
    fn test_text_roundtrip() {
        let keypair = Keypair::from_seed(&[0x42; 32]);
        let record = RecordBuilder::new(b"/target/a".to_vec())
            .expires_at(1_736_870_400_000)
            .sign(&keypair);

        let text = record.to_text();
        let decoded = Record::from_text(&text).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_from_text_rejects_bad_base64() {
        assert!(Record::from_text("not//valid??").is_err());
    }
}
