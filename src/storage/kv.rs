//! Key-value stores backing the snapshot blobs.

use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Durable write or read failure.
///
/// Surfaced to the caller without retry; the in-memory model remains the
/// source of truth for the rest of the session.
#[derive(Debug, Error)]
pub enum PersistenceFailure {
    #[error("storage read failed: {0}")]
    Read(String),

    #[error("storage write failed: {0}")]
    Write(String),

    #[error("snapshot decode failed: {0}")]
    Decode(String),
}

/// A durable string-keyed blob store.
///
/// Absence of a key is a valid empty state, not an error.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceFailure>;
    fn put(&mut self, key: &str, value: &str) -> Result<(), PersistenceFailure>;
    fn delete(&mut self, key: &str) -> Result<(), PersistenceFailure>;
}

/// SQLite-backed key-value store.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create a database at the given path.
    pub fn open(path: &Path) -> Result<Self, PersistenceFailure> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| PersistenceFailure::Write(e.to_string()))?;
        }

        let conn =
            Connection::open(path).map_err(|e| PersistenceFailure::Write(e.to_string()))?;

        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, PersistenceFailure> {
        let conn =
            Connection::open_in_memory().map_err(|e| PersistenceFailure::Write(e.to_string()))?;

        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    fn initialize(&self) -> Result<(), PersistenceFailure> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS blobs (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );",
            )
            .map_err(|e| PersistenceFailure::Write(e.to_string()))
    }
}

impl KeyValueStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceFailure> {
        self.conn
            .query_row("SELECT value FROM blobs WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()
            .map_err(|e| PersistenceFailure::Read(e.to_string()))
    }

    fn put(&mut self, key: &str, value: &str) -> Result<(), PersistenceFailure> {
        self.conn
            .execute(
                "INSERT INTO blobs (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )
            .map(|_| ())
            .map_err(|e| PersistenceFailure::Write(e.to_string()))
    }

    fn delete(&mut self, key: &str) -> Result<(), PersistenceFailure> {
        self.conn
            .execute("DELETE FROM blobs WHERE key = ?1", params![key])
            .map(|_| ())
            .map_err(|e| PersistenceFailure::Write(e.to_string()))
    }
}

/// In-memory key-value store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceFailure> {
        Ok(self.blobs.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &str) -> Result<(), PersistenceFailure> {
        self.blobs.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<(), PersistenceFailure> {
        self.blobs.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_key_is_none() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.get("workouts").unwrap().is_none());
    }

    #[test]
    fn test_put_get_overwrite_delete() {
        let mut db = Database::open_in_memory().unwrap();

        db.put("workouts", "[]").unwrap();
        assert_eq!(db.get("workouts").unwrap().as_deref(), Some("[]"));

        db.put("workouts", "[1]").unwrap();
        assert_eq!(db.get("workouts").unwrap().as_deref(), Some("[1]"));

        db.delete("workouts").unwrap();
        assert!(db.get("workouts").unwrap().is_none());
    }

    #[test]
    fn test_on_disk_database_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("maptrail.db");

        {
            let mut db = Database::open(&path).unwrap();
            db.put("shapes", "[{\"id\":1}]").unwrap();
        }

        let db = Database::open(&path).unwrap();
        assert_eq!(db.get("shapes").unwrap().as_deref(), Some("[{\"id\":1}]"));
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        store.put("a", "1").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
        store.delete("a").unwrap();
        assert!(store.get("a").unwrap().is_none());
    }
}
