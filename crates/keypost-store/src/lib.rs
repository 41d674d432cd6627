//! # keypost Store
//!
//! Storage abstraction for keypost name records. Provides a trait-based
//! interface for the durable key ID → latest record mapping, with SQLite
//! and in-memory implementations.
//!
//! The store is deliberately dumb: `get` and `put` with overwrite semantics,
//! at most one entry per key ID, no ordering logic. All ordering is enforced
//! by the record validator before `put` is ever called.
//!
//! ## Key Types
//!
//! - [`NameStore`] - The async trait for record persistence
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::NameStore;
