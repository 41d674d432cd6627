//! Canonical CBOR encoding of the record envelope.
//!
//! Records are encoded as an RFC 8949 deterministic CBOR map with integer
//! keys: smallest integer encodings, definite lengths, keys in ascending
//! order, no floats. The signature covers the canonical encoding of the map
//! without the signature entry, so the signed bytes are reproducible on any
//! platform.

use ciborium::value::Value;

use crate::crypto::{PublicKey, Signature};
use crate::error::CoreError;
use crate::record::Record;

/// Envelope field keys. Keys 0-23 encode as single bytes in CBOR.
mod keys {
    pub const VALUE: u64 = 0;
    pub const SEQUENCE: u64 = 1;
    pub const EXPIRES_AT: u64 = 2;
    pub const PUBLIC_KEY: u64 = 3;
    pub const SIGNATURE: u64 = 4;
}

/// The bytes a record's signature is computed over: the canonical map of
/// value, sequence, expiry, and embedded key.
pub fn signed_message(
    value: &[u8],
    sequence: u64,
    expires_at: i64,
    public_key: Option<&PublicKey>,
) -> Vec<u8> {
    let mut buf = Vec::with_capacity(value.len() + 64);
    write_envelope(&mut buf, value, sequence, expires_at, public_key, None);
    buf
}

/// Encode a complete record to envelope bytes.
pub fn encode_record(record: &Record) -> Vec<u8> {
    let mut buf = Vec::with_capacity(record.value.len() + 128);
    write_envelope(
        &mut buf,
        &record.value,
        record.sequence,
        record.expires_at,
        record.public_key.as_ref(),
        Some(&record.signature),
    );
    buf
}

fn write_envelope(
    buf: &mut Vec<u8>,
    value: &[u8],
    sequence: u64,
    expires_at: i64,
    public_key: Option<&PublicKey>,
    signature: Option<&Signature>,
) {
    // Keys are written in ascending order, which is canonical for
    // single-byte integer keys.
    let entries = 4 + signature.is_some() as u64;
    write_uint(buf, 5, entries);

    write_uint(buf, 0, keys::VALUE);
    write_byte_string(buf, value);

    write_uint(buf, 0, keys::SEQUENCE);
    write_uint(buf, 0, sequence);

    write_uint(buf, 0, keys::EXPIRES_AT);
    write_int(buf, expires_at);

    write_uint(buf, 0, keys::PUBLIC_KEY);
    match public_key {
        Some(pk) => write_byte_string(buf, &pk.0),
        None => buf.push(0xf6), // null
    }

    if let Some(sig) = signature {
        write_uint(buf, 0, keys::SIGNATURE);
        write_byte_string(buf, &sig.0);
    }
}

/// Encode an unsigned integer with the given major type, smallest form.
fn write_uint(buf: &mut Vec<u8>, major: u8, n: u64) {
    let mt = major << 5;
    if n < 24 {
        buf.push(mt | (n as u8));
    } else if n <= 0xff {
        buf.push(mt | 24);
        buf.push(n as u8);
    } else if n <= 0xffff {
        buf.push(mt | 25);
        buf.extend_from_slice(&(n as u16).to_be_bytes());
    } else if n <= 0xffff_ffff {
        buf.push(mt | 26);
        buf.extend_from_slice(&(n as u32).to_be_bytes());
    } else {
        buf.push(mt | 27);
        buf.extend_from_slice(&n.to_be_bytes());
    }
}

/// Encode a signed integer (major types 0 and 1).
fn write_int(buf: &mut Vec<u8>, n: i64) {
    if n >= 0 {
        write_uint(buf, 0, n as u64);
    } else {
        // CBOR encodes -1 as 0, -2 as 1, etc.
        write_uint(buf, 1, (-1 - n) as u64);
    }
}

/// Encode a byte string (major type 2).
fn write_byte_string(buf: &mut Vec<u8>, bytes: &[u8]) {
    write_uint(buf, 2, bytes.len() as u64);
    buf.extend_from_slice(bytes);
}

/// Decode envelope bytes into a record.
pub fn decode_record(bytes: &[u8]) -> Result<Record, CoreError> {
    let cursor = std::io::Cursor::new(bytes);
    let value: Value = ciborium::from_reader(cursor)
        .map_err(|e| CoreError::MalformedRecord(e.to_string()))?;

    let map = match value {
        Value::Map(m) => m,
        _ => return Err(CoreError::MalformedRecord("expected map".into())),
    };

    let get = |key: u64| -> Option<&Value> {
        map.iter()
            .find(|(k, _)| {
                matches!(k, Value::Integer(i) if i128::from(*i) == i128::from(key))
            })
            .map(|(_, v)| v)
    };

    let target = match get(keys::VALUE) {
        Some(Value::Bytes(b)) => b.clone(),
        _ => return Err(CoreError::MalformedRecord("missing value".into())),
    };

    let sequence = match get(keys::SEQUENCE) {
        Some(Value::Integer(i)) => {
            let n = i128::from(*i);
            u64::try_from(n)
                .map_err(|_| CoreError::MalformedRecord("sequence out of range".into()))?
        }
        _ => return Err(CoreError::MalformedRecord("missing sequence".into())),
    };

    let expires_at = match get(keys::EXPIRES_AT) {
        Some(Value::Integer(i)) => {
            let n = i128::from(*i);
            i64::try_from(n)
                .map_err(|_| CoreError::MalformedRecord("expiry out of range".into()))?
        }
        _ => return Err(CoreError::MalformedRecord("missing expiry".into())),
    };

    let public_key = match get(keys::PUBLIC_KEY) {
        Some(Value::Bytes(b)) if b.len() == 32 => {
            let mut arr = [0u8; 32];
            arr.copy_from_slice(b);
            Some(PublicKey(arr))
        }
        Some(Value::Null) | None => None,
        _ => return Err(CoreError::MalformedRecord("invalid public key".into())),
    };

    let signature = match get(keys::SIGNATURE) {
        Some(Value::Bytes(b)) if b.len() == 64 => {
            let mut arr = [0u8; 64];
            arr.copy_from_slice(b);
            Signature(arr)
        }
        _ => return Err(CoreError::MalformedRecord("missing signature".into())),
    };

    Ok(Record {
        value: target.into(),
        sequence,
        expires_at,
        public_key,
        signature,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Keypair;
    use crate::record::RecordBuilder;

    #[test]
    fn test_record_roundtrip() {
        let keypair = Keypair::from_seed(&[0x42; 32]);
        let record = RecordBuilder::new(b"/target/a".to_vec())
            .expires_at(1_736_870_400_000)
            .sign(&keypair);

        let bytes = encode_record(&record);
        let decoded = decode_record(&bytes).unwrap();

        assert_eq!(decoded.value, record.value);
        assert_eq!(decoded.sequence, record.sequence);
        assert_eq!(decoded.expires_at, record.expires_at);
        assert_eq!(decoded.public_key, record.public_key);
        assert_eq!(decoded.signature, record.signature);
    }

    #[test]
    fn test_roundtrip_with_embedded_key() {
        let keypair = Keypair::from_seed(&[0x01; 32]);
        let record = RecordBuilder::new(b"/target/b".to_vec())
            .expires_at(1_736_870_400_000)
            .embed_public_key()
            .sign(&keypair);

        let decoded = decode_record(&encode_record(&record)).unwrap();
        assert_eq!(decoded.public_key, Some(keypair.public_key()));
    }

    #[test]
    fn test_encoding_deterministic() {
        let keypair = Keypair::from_seed(&[0x42; 32]);
        let record = RecordBuilder::new(b"/target/a".to_vec())
            .expires_at(1_736_870_400_000)
            .sign(&keypair);

        assert_eq!(encode_record(&record), encode_record(&record));
    }

    #[test]
    fn test_signed_message_excludes_signature() {
        let keypair = Keypair::from_seed(&[0x42; 32]);
        let record = RecordBuilder::new(b"/target/a".to_vec())
            .expires_at(1_736_870_400_000)
            .sign(&keypair);

        let signed = record.signed_message();
        let envelope = encode_record(&record);
        assert!(envelope.len() > signed.len());
        // The signed message is the envelope minus the signature entry,
        // so the envelope cannot start with it (different map length header).
        assert_ne!(&envelope[..1], &signed[..1]);
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(decode_record(&[]).is_err());
        assert!(decode_record(&[0xff, 0x00, 0x01]).is_err());
        // A valid CBOR array is still not a record map.
        assert!(decode_record(&[0x80]).is_err());
    }

    #[test]
    fn test_uint_smallest_encoding() {
        let mut buf = Vec::new();
        write_uint(&mut buf, 0, 0);
        assert_eq!(buf, vec![0x00]);

        buf.clear();
        write_uint(&mut buf, 0, 23);
        assert_eq!(buf, vec![0x17]);

        buf.clear();
        write_uint(&mut buf, 0, 24);
        assert_eq!(buf, vec![0x18, 24]);

        buf.clear();
        write_uint(&mut buf, 0, 256);
        assert_eq!(buf, vec![0x19, 0x01, 0x00]);
    }

    #[test]
    fn test_negative_int_encoding() {
        let mut buf = Vec::new();
        write_int(&mut buf, -1);
        assert_eq!(buf, vec![0x20]);

        buf.clear();
        write_int(&mut buf, -25);
        assert_eq!(buf, vec![0x38, 24]);
    }
}
