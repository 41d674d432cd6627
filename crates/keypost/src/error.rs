//! Error types for the keypost API.

use keypost_core::{KeyIdError, ValidationError};
use keypost_store::StoreError;
use thiserror::Error;

/// Errors surfaced by [`NameSystem`](crate::NameSystem) operations.
///
/// `KeyId` and `Validation` failures are fatal to the operation and not
/// retryable, with one exception: a `StaleSequence` inside `Validation`
/// means another publish won the race, and the caller may rebuild a
/// higher-sequence record and retry. `Store` errors are retryable at the
/// caller's discretion.
#[derive(Debug, Error)]
pub enum Error {
    /// The key ID failed to parse (wrong codec, bad encoding, ...).
    #[error("key ID error: {0}")]
    KeyId(#[from] KeyIdError),

    /// Record validation failed.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// The supplied private key does not belong to the key ID.
    #[error("private key does not match the key ID")]
    KeyMismatch,

    /// Bad private-key text on the external interface.
    #[error("malformed input: {0}")]
    MalformedInput(String),
}

/// Result type for keypost operations.
pub type Result<T> = std::result::Result<T, Error>;
