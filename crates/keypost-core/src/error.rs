//! Error types for keypost core.

use thiserror::Error;

/// Low-level errors from crypto and codec operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("invalid private key")]
    InvalidPrivateKey,

    #[error("malformed record: {0}")]
    MalformedRecord(String),
}

/// Errors from parsing a textual key ID.
///
/// `InvalidKeyCode` is the gate every operation runs first: an identifier
/// carrying any codec other than libp2p-key is rejected before signature
/// or codec work happens.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyIdError {
    #[error("invalid key code: 0x{0:x}")]
    InvalidKeyCode(u64),

    #[error("unsupported digest function: 0x{0:x} (key IDs use the identity hash)")]
    UnsupportedDigest(u64),

    #[error("invalid digest length: {0}")]
    InvalidDigestLength(usize),

    #[error("not a base36 multibase string")]
    InvalidMultibase,

    #[error("malformed identifier: {0}")]
    MalformedIdentifier(String),
}

/// Validation failures for a published record.
///
/// All of these are fatal to the publish attempt. Only `StaleSequence` is
/// sensibly retryable, by rebuilding the record with a higher sequence.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("malformed record: {0}")]
    MalformedRecord(String),

    #[error("embedded public key does not match the key ID")]
    EmbeddedKeyMismatch,

    #[error("signature verification failed")]
    SignatureInvalid,

    #[error("stale sequence number: stored record has {current}, incoming has {incoming}")]
    StaleSequence { current: u64, incoming: u64 },
}

impl From<CoreError> for ValidationError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::InvalidSignature => ValidationError::SignatureInvalid,
            CoreError::InvalidPublicKey | CoreError::InvalidPrivateKey => {
                ValidationError::SignatureInvalid
            }
            CoreError::MalformedRecord(msg) => ValidationError::MalformedRecord(msg),
        }
    }
}
