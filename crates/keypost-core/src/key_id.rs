//! Key identity: the self-certifying textual identifier for a keypair.
//!
//! A key ID is a CIDv1 carrying the libp2p-key codec and an *identity*
//! multihash over the raw Ed25519 public key, rendered as multibase base36.
//! Because the digest is the key itself, the public key is recoverable from
//! the identifier alone with no registry lookup.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::crypto::PublicKey;
use crate::error::KeyIdError;

/// CID version prefix.
const CID_V1: u8 = 0x01;

/// The reserved multicodec for public-key identifiers.
pub const LIBP2P_KEY_CODE: u64 = 0x72;

/// Multihash code for the identity (no-op) hash function.
const IDENTITY_CODE: u64 = 0x00;

/// Length of an Ed25519 public key, and thus of every key ID digest.
const DIGEST_LEN: usize = 32;

/// Multibase prefix for base36 lowercase.
const BASE36_PREFIX: char = 'k';

/// A self-certifying key identifier.
///
/// Wraps the raw public key bytes; derivation and parsing are the only ways
/// to obtain one, and a parsed `KeyId` is guaranteed to carry the libp2p-key
/// codec and an identity digest of the right length.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyId([u8; 32]);

impl KeyId {
    /// Derive the key ID for a public key. Deterministic, no side effects.
    pub fn from_public_key(public_key: &PublicKey) -> Self {
        Self(public_key.0)
    }

    /// Recover the public key embedded in this identifier.
    ///
    /// Always possible: the digest is an identity hash of the key bytes,
    /// not a one-way hash.
    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.0)
    }

    /// Parse a base36 textual key ID.
    ///
    /// The codec check runs before anything cryptographic: identifiers with
    /// a non-key codec fail `InvalidKeyCode` here and never reach signature
    /// verification.
    pub fn parse(text: &str) -> Result<Self, KeyIdError> {
        let rest = text
            .strip_prefix(BASE36_PREFIX)
            .ok_or(KeyIdError::InvalidMultibase)?;
        let bytes = base36_decode(rest)?;

        let mut pos = 0;
        let version = read_byte(&bytes, &mut pos)?;
        if version != CID_V1 {
            return Err(KeyIdError::MalformedIdentifier(format!(
                "unsupported CID version: {}",
                version
            )));
        }

        let codec = read_uvarint(&bytes, &mut pos)?;
        if codec != LIBP2P_KEY_CODE {
            return Err(KeyIdError::InvalidKeyCode(codec));
        }

        let hash_code = read_uvarint(&bytes, &mut pos)?;
        if hash_code != IDENTITY_CODE {
            // A non-identity digest makes the public key unrecoverable
            // from the identifier.
            return Err(KeyIdError::UnsupportedDigest(hash_code));
        }

        let digest_len = read_uvarint(&bytes, &mut pos)? as usize;
        let digest = &bytes[pos..];
        if digest_len != DIGEST_LEN || digest.len() != DIGEST_LEN {
            return Err(KeyIdError::InvalidDigestLength(digest.len()));
        }

        let mut key = [0u8; 32];
        key.copy_from_slice(digest);
        Ok(Self(key))
    }

    /// The raw digest bytes (the public key).
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 0x01 (CIDv1) || 0x72 (libp2p-key) || 0x00 0x20 (identity, 32 bytes)
        let mut cid = Vec::with_capacity(4 + DIGEST_LEN);
        cid.push(CID_V1);
        cid.push(LIBP2P_KEY_CODE as u8);
        cid.push(IDENTITY_CODE as u8);
        cid.push(DIGEST_LEN as u8);
        cid.extend_from_slice(&self.0);

        write!(f, "{}{}", BASE36_PREFIX, base36_encode(&cid))
    }
}

impl fmt::Debug for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyId({})", self)
    }
}

impl FromStr for KeyId {
    type Err = KeyIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn read_byte(bytes: &[u8], pos: &mut usize) -> Result<u8, KeyIdError> {
    let b = *bytes
        .get(*pos)
        .ok_or_else(|| KeyIdError::MalformedIdentifier("truncated".into()))?;
    *pos += 1;
    Ok(b)
}

/// Read an unsigned LEB128 varint.
fn read_uvarint(bytes: &[u8], pos: &mut usize) -> Result<u64, KeyIdError> {
    let mut value: u64 = 0;
    let mut shift = 0;
    loop {
        let b = read_byte(bytes, pos)?;
        if shift >= 63 && b > 1 {
            return Err(KeyIdError::MalformedIdentifier("varint overflow".into()));
        }
        value |= u64::from(b & 0x7f) << shift;
        if b & 0x80 == 0 {
            return Ok(value);
        }
        shift += 7;
    }
}

const BASE36_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Base36 lowercase encoding (big-endian number, repeated division).
fn base36_encode(data: &[u8]) -> String {
    let zeroes = data.iter().take_while(|&&b| b == 0).count();

    // Little-endian base36 digit accumulator.
    let mut digits: Vec<u8> = Vec::with_capacity(data.len() * 2);
    for &byte in &data[zeroes..] {
        let mut carry = byte as u32;
        for d in digits.iter_mut() {
            carry += (*d as u32) << 8;
            *d = (carry % 36) as u8;
            carry /= 36;
        }
        while carry > 0 {
            digits.push((carry % 36) as u8);
            carry /= 36;
        }
    }

    let mut out = String::with_capacity(zeroes + digits.len());
    for _ in 0..zeroes {
        out.push('0');
    }
    for &d in digits.iter().rev() {
        out.push(BASE36_ALPHABET[d as usize] as char);
    }
    out
}

/// Base36 lowercase decoding. Rejects any character outside the alphabet.
fn base36_decode(text: &str) -> Result<Vec<u8>, KeyIdError> {
    let zeroes = text.bytes().take_while(|&c| c == b'0').count();

    // Little-endian byte accumulator.
    let mut bytes: Vec<u8> = Vec::with_capacity(text.len());
    for c in text.bytes().skip(zeroes) {
        let digit = match c {
            b'0'..=b'9' => c - b'0',
            b'a'..=b'z' => c - b'a' + 10,
            _ => return Err(KeyIdError::InvalidMultibase),
        };
        let mut carry = digit as u32;
        for b in bytes.iter_mut() {
            carry += *b as u32 * 36;
            *b = carry as u8;
            carry >>= 8;
        }
        while carry > 0 {
            bytes.push(carry as u8);
            carry >>= 8;
        }
    }

    let mut out = vec![0u8; zeroes];
    out.extend(bytes.iter().rev());
    Ok(out)
}
