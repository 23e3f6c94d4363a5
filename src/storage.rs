//! Local persistence for journals, achievements, and accounts.
//!
//! Everything lives in one `SQLite` file under the storage root:
//!
//! ```text
//! <root>/
//!   wayfarer.sqlite   # kv(key TEXT PRIMARY KEY, value TEXT)
//! ```
//!
//! Values are JSON documents. Keys are namespaced by prefix:
//! `journal:<uuid>`, `user:<username>`, `achievements`, `session`.

mod journal;

use std::{fs, io, path::PathBuf};

use rusqlite::Connection;
use uuid::Uuid;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("journal not found: {0}")]
    JournalNotFound(Uuid),

    #[error("journal already exists: {0}")]
    JournalAlreadyExists(Uuid),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type Result<T> = core::result::Result<T, StorageError>;

/// A string-keyed, string-valued store.
///
/// The seam between domain logic and persistence: achievement tracking and
/// local accounts are written against this trait, not against `SQLite`.
pub trait KeyValueStore {
    /// Returns the value for `key`, or `None` if absent.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Inserts or replaces the value for `key`.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Returns whether it was present.
    fn remove(&self, key: &str) -> Result<bool>;

    /// All keys starting with `prefix`, in ascending order.
    fn keys(&self, prefix: &str) -> Result<Vec<String>>;
}

/// `SQLite`-backed storage.
pub struct Storage {
    conn: Connection,
}

impl Storage {
    /// Opens (or creates) the database under the given root directory.
    ///
    /// The directory is created if it doesn't exist.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        let conn = Connection::open(root.join("wayfarer.sqlite"))?;
        Self::init(conn)
    }

    /// Opens a throwaway database that lives only as long as the handle.
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL
            );",
        )?;
        Ok(Self { conn })
    }
}

impl KeyValueStore for Storage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self.conn.prepare_cached("SELECT value FROM kv WHERE key = ?1")?;
        let mut rows = stmt.query([key])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            [key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let rows = self.conn.execute("DELETE FROM kv WHERE key = ?1", [key])?;
        Ok(rows > 0)
    }

    fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT key FROM kv WHERE substr(key, 1, length(?1)) = ?1 ORDER BY key",
        )?;
        let keys = stmt
            .query_map([prefix], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(keys)
    }
}
