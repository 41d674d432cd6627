//! Record validation: authenticity and the monotonic sequence gate.
//!
//! Checks run cheapest-first and fail fast, so malformed or misrouted input
//! never reaches the signature primitive. Key-code checking happens even
//! earlier, in [`KeyId::parse`], before a raw record is looked at.

use crate::error::ValidationError;
use crate::key_id::KeyId;
use crate::record::Record;

/// Validate an incoming raw record for a key ID against the previously
/// stored raw record, if any.
///
/// 1. Decode the envelope (`MalformedRecord`).
/// 2. If a public key is embedded, it must equal the key recoverable from
///    the key ID (`EmbeddedKeyMismatch`); either way the key-ID-derived key
///    is what the signature is checked against.
/// 3. Verify the signature over the signed fields (`SignatureInvalid`).
/// 4. If a previous record exists, the incoming sequence must be strictly
///    greater (`StaleSequence`). Equal sequence numbers are rejected even
///    when the target value differs.
///
/// On success the caller owns persistence; the validator writes nothing.
pub fn validate_record(
    key: &KeyId,
    raw: &[u8],
    prev_raw: Option<&[u8]>,
) -> Result<(), ValidationError> {
    let record = Record::from_bytes(raw)
        .map_err(|e| ValidationError::MalformedRecord(e.to_string()))?;

    let authoritative = key.public_key();
    if let Some(embedded) = &record.public_key {
        if *embedded != authoritative {
            return Err(ValidationError::EmbeddedKeyMismatch);
        }
    }

    authoritative
        .verify(&record.signed_message(), &record.signature)
        .map_err(|_| ValidationError::SignatureInvalid)?;

    if let Some(prev_raw) = prev_raw {
        let prev = Record::from_bytes(prev_raw)
            .map_err(|e| ValidationError::MalformedRecord(e.to_string()))?;
        if record.sequence <= prev.sequence {
            return Err(ValidationError::StaleSequence {
                current: prev.sequence,
                incoming: record.sequence,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Keypair;
    use crate::record::RecordBuilder;

    fn make_keypair() -> Keypair {
        Keypair::from_seed(&[0x42; 32])
    }

    fn key_id(keypair: &Keypair) -> KeyId {
        KeyId::from_public_key(&keypair.public_key())
    }

    #[test]
    fn test_valid_record_accepted() {
        let keypair = make_keypair();
        let raw = RecordBuilder::new(b"/target/a".to_vec())
            .sign(&keypair)
            .to_bytes();

        assert!(validate_record(&key_id(&keypair), &raw, None).is_ok());
    }

    #[test]
    fn test_valid_record_with_embedded_key_accepted() {
        let keypair = make_keypair();
        let raw = RecordBuilder::new(b"/target/a".to_vec())
            .embed_public_key()
            .sign(&keypair)
            .to_bytes();

        assert!(validate_record(&key_id(&keypair), &raw, None).is_ok());
    }

    #[test]
    fn test_malformed_record() {
        let keypair = make_keypair();
        let result = validate_record(&key_id(&keypair), &[0xde, 0xad], None);
        assert!(matches!(result, Err(ValidationError::MalformedRecord(_))));
    }

    #[test]
    fn test_embedded_key_mismatch() {
        let signer = make_keypair();
        let other = Keypair::from_seed(&[0x07; 32]);

        // Signed by `signer`, but filed under `other`'s key ID. The embedded
        // key contradicts the identifier before any signature check.
        let raw = RecordBuilder::new(b"/target/a".to_vec())
            .embed_public_key()
            .sign(&signer)
            .to_bytes();

        let result = validate_record(&key_id(&other), &raw, None);
        assert!(matches!(result, Err(ValidationError::EmbeddedKeyMismatch)));
    }

    #[test]
    fn test_wrong_signer_without_embedded_key() {
        let signer = make_keypair();
        let other = Keypair::from_seed(&[0x07; 32]);

        let raw = RecordBuilder::new(b"/target/a".to_vec())
            .sign(&signer)
            .to_bytes();

        // No embedded key to compare, so this falls through to the
        // signature check against the key ID's own key.
        let result = validate_record(&key_id(&other), &raw, None);
        assert!(matches!(result, Err(ValidationError::SignatureInvalid)));
    }

    #[test]
    fn test_tampered_value_fails_signature() {
        let keypair = make_keypair();
        let mut record = RecordBuilder::new(b"/target/a".to_vec()).sign(&keypair);
        record.value = b"/target/evil".to_vec().into();

        let result = validate_record(&key_id(&keypair), &record.to_bytes(), None);
        assert!(matches!(result, Err(ValidationError::SignatureInvalid)));
    }

    #[test]
    fn test_tampered_sequence_fails_signature() {
        let keypair = make_keypair();
        let mut record = RecordBuilder::new(b"/target/a".to_vec()).sign(&keypair);
        record.sequence = 99;

        let result = validate_record(&key_id(&keypair), &record.to_bytes(), None);
        assert!(matches!(result, Err(ValidationError::SignatureInvalid)));
    }

    #[test]
    fn test_stale_sequence_rejected() {
        let keypair = make_keypair();
        let r0 = RecordBuilder::new(b"/target/a".to_vec()).sign(&keypair);
        let r1 = RecordBuilder::new(b"/target/b".to_vec())
            .prev(&r0)
            .sign(&keypair);
        assert_eq!(r1.sequence, 1);

        let id = key_id(&keypair);

        // Replay of the older record against the newer one.
        let result = validate_record(&id, &r0.to_bytes(), Some(&r1.to_bytes()));
        assert!(matches!(
            result,
            Err(ValidationError::StaleSequence {
                current: 1,
                incoming: 0
            })
        ));
    }

    #[test]
    fn test_equal_sequence_rejected_even_with_different_value() {
        let keypair = make_keypair();
        let stored = RecordBuilder::new(b"/target/a".to_vec()).sign(&keypair);
        // A fresh record with no `prev` also lands on sequence 0.
        let incoming = RecordBuilder::new(b"/target/b".to_vec()).sign(&keypair);
        assert_eq!(incoming.sequence, stored.sequence);

        let result = validate_record(
            &key_id(&keypair),
            &incoming.to_bytes(),
            Some(&stored.to_bytes()),
        );
        assert!(matches!(
            result,
            Err(ValidationError::StaleSequence { .. })
        ));
    }

    #[test]
    fn test_greater_sequence_accepted() {
        let keypair = make_keypair();
        let r0 = RecordBuilder::new(b"/target/a".to_vec()).sign(&keypair);
        let r1 = RecordBuilder::new(b"/target/b".to_vec())
            .prev(&r0)
            .sign(&keypair);

        let id = key_id(&keypair);
        assert!(validate_record(&id, &r1.to_bytes(), Some(&r0.to_bytes())).is_ok());
    }

    #[test]
    fn test_malformed_previous_record() {
        let keypair = make_keypair();
        let raw = RecordBuilder::new(b"/target/a".to_vec())
            .sign(&keypair)
            .to_bytes();

        let result = validate_record(&key_id(&keypair), &raw, Some(&[0x00, 0x01]));
        assert!(matches!(result, Err(ValidationError::MalformedRecord(_))));
    }
}
