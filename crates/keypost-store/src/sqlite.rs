//! SQLite implementation of the NameStore trait.
//!
//! The primary storage backend. Uses rusqlite with bundled SQLite, wrapped
//! in async via tokio::task::spawn_blocking so database work never blocks
//! the runtime.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use rusqlite::{params, Connection, OptionalExtension};

use keypost_core::KeyId;

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::NameStore;

/// SQLite-based name store.
///
/// The connection lives behind a mutex shared with blocking tasks.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database. Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

fn lock_conn(conn: &Arc<Mutex<Connection>>) -> Result<std::sync::MutexGuard<'_, Connection>> {
    conn.lock().map_err(|e| {
        StoreError::Database(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_LOCKED),
            Some(format!("mutex poisoned: {}", e)),
        ))
    })
}

#[async_trait]
impl NameStore for SqliteStore {
    async fn get(&self, key: &KeyId) -> Result<Option<Bytes>> {
        let conn = self.conn.clone();
        let key_text = key.to_string();

        tokio::task::spawn_blocking(move || {
            let conn = lock_conn(&conn)?;
            let record: Option<Vec<u8>> = conn
                .query_row(
                    "SELECT record FROM names WHERE key_id = ?1",
                    params![key_text],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(record.map(Bytes::from))
        })
        .await
        .map_err(|e| StoreError::InvalidData(format!("task join error: {}", e)))?
    }

    async fn put(&self, key: &KeyId, record: &[u8]) -> Result<()> {
        let conn = self.conn.clone();
        let key_text = key.to_string();
        let record = record.to_vec();

        tokio::task::spawn_blocking(move || {
            let conn = lock_conn(&conn)?;
            conn.execute(
                "INSERT INTO names (key_id, record, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key_id) DO UPDATE SET record = ?2, updated_at = ?3",
                params![key_text, record, now_millis()],
            )?;
            tracing::debug!(key_id = %key_text, bytes = record.len(), "record stored");
            Ok(())
        })
        .await
        .map_err(|e| StoreError::InvalidData(format!("task join error: {}", e)))?
    }
}

/// Current time in milliseconds.
fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_millis() as i64
}
