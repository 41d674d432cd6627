//! # keypost Core
//!
//! Pure primitives for keypost: key identity, signed name records, and the
//! record envelope codec.
//!
//! This crate contains no I/O, no storage, no networking. It is pure
//! computation over cryptographic data structures.
//!
//! ## Key Types
//!
//! - [`KeyId`] - Self-certifying identifier derived from an Ed25519 public key
//! - [`Record`] - A signed pointer from a key ID to an opaque target value
//! - [`RecordBuilder`] - Constructs the next record for a target value
//! - [`Keypair`] - Ed25519 signing keypair
//!
//! ## Validation
//!
//! [`validate_record`] enforces record authenticity and the strictly
//! increasing sequence-number invariant. See the [`validation`] module.

pub mod canonical;
pub mod crypto;
pub mod error;
pub mod key_id;
pub mod record;
pub mod validation;

pub use canonical::{decode_record, encode_record, signed_message};
pub use crypto::{Keypair, PublicKey, Signature};
pub use error::{CoreError, KeyIdError, ValidationError};
pub use key_id::KeyId;
pub use record::{Record, RecordBuilder, RECORD_LIFETIME_MS};
pub use validation::validate_record;
