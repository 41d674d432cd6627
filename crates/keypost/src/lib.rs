//! keypost: a mutable name-resolution record store.
//!
//! Names are self-certifying: a name is the base36 key ID derived from an
//! Ed25519 public key, and a name's current value is carried by a signed
//! record whose sequence number must strictly increase on every change.
//! Anyone can verify a record against the name alone; only the private key
//! holder can produce one.
//!
//! This crate is the front door. [`NameSystem`] wires the record format
//! and validation from `keypost-core` to a [`NameStore`](store::NameStore)
//! backend from
//! `keypost-store` and exposes the four operations: keypair creation,
//! record creation, publish, and resolve.
//!
//! ```no_run
//! use keypost::{create_keypair, NameSystem};
//! use keypost::store::MemoryStore;
//!
//! # async fn demo() -> keypost::Result<()> {
//! let system = NameSystem::new(MemoryStore::new());
//! let keypair = create_keypair();
//!
//! let record = system
//!     .create_record(&keypair.private_key, &keypair.id, b"/target/abc")
//!     .await?;
//! system.publish(&keypair.id, &record).await?;
//!
//! let resolved = system.resolve(&keypair.id).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod name_system;

pub use error::{Error, Result};
pub use name_system::{create_keypair, KeypairHandle, NameSystem, Resolved};

pub use keypost_core as core;
pub use keypost_store as store;
