//! Key-value persistence.
//!
//! Panels talk to [`Persistence`], which never returns an error: storage
//! failures are logged and the app carries on with its in-memory state.

use rusqlite::{params, Connection, OptionalExtension};
use serde::{de::DeserializeOwned, Serialize};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::StorageError;

/// Keys written by the panels. Names are kept stable so existing stores
/// keep loading.
pub mod keys {
    pub const ACTIVE_TAB: &str = "ff_command_center_active_tab";
    pub const USER_SESSION: &str = "ff_command_center_user_session";
    pub const DEVICE_MODEL: &str = "ff_aim_device_model";
    pub const PRESETS: &str = "ff_aim_presets";
    pub const ASSIST_POS: &str = "ff_assist_pos";
    pub const MACRO_POS: &str = "ff_macro_pos";
    pub const FEEDBACK_HISTORY: &str = "ff_feedback_history";
}

/// Opaque string store
pub trait KvStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
    fn clear(&self) -> Result<(), StorageError>;
}

/// SQLite-backed store, one row per key
#[derive(Debug)]
pub struct SqliteKvStore {
    conn: Connection,
}

impl SqliteKvStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StorageError::Unavailable(format!("failed to create {}: {}", parent.display(), e))
            })?;
        }
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StorageError> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
            [],
        )?;
        Ok(Self { conn })
    }
}

impl KvStore for SqliteKvStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn.execute(
            r#"
            INSERT INTO kv (key, value) VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.conn.execute("DELETE FROM kv WHERE key = ?1", [key])?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.conn.execute("DELETE FROM kv", [])?;
        Ok(())
    }
}

/// Volatile store, used when the database cannot be opened and in tests
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    map: RefCell<BTreeMap<String, String>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryKvStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.map.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.map.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.map.borrow_mut().remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.map.borrow_mut().clear();
        Ok(())
    }
}

/// Silent-failure adapter over a [`KvStore`]
pub struct Persistence {
    store: Box<dyn KvStore>,
}

impl std::fmt::Debug for Persistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Persistence").finish_non_exhaustive()
    }
}

impl Persistence {
    pub fn new(store: Box<dyn KvStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryKvStore::new()))
    }

    /// Open the SQLite store at `path`, degrading to memory if that fails
    pub fn open_or_memory<P: AsRef<Path>>(path: P) -> Self {
        match SqliteKvStore::open(path.as_ref()) {
            Ok(store) => Self::new(Box::new(store)),
            Err(e) => {
                tracing::warn!(path = %path.as_ref().display(), error = %e, "falling back to in-memory store");
                Self::in_memory()
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.store.get(key).unwrap_or_else(|e| {
            tracing::warn!(key, error = %e, "storage read failed");
            None
        })
    }

    pub fn set(&self, key: &str, value: &str) {
        if let Err(e) = self.store.set(key, value) {
            tracing::warn!(key, error = %e, "storage write failed");
        }
    }

    pub fn remove(&self, key: &str) {
        if let Err(e) = self.store.remove(key) {
            tracing::warn!(key, error = %e, "storage remove failed");
        }
    }

    pub fn clear(&self) {
        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "storage clear failed");
        }
    }

    /// Decode a JSON blob. Missing and corrupt values both read as `None`.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "ignoring corrupt stored value");
                None
            }
        }
    }

    pub fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(raw) => self.set(key, &raw),
            Err(source) => {
                let e = StorageError::Serialize {
                    key: key.to_string(),
                    source,
                };
                tracing::warn!(error = %e, "storage write skipped");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    struct BrokenStore;

    impl KvStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("quota".into()))
        }
        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("quota".into()))
        }
        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("quota".into()))
        }
        fn clear(&self) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("quota".into()))
        }
    }

    #[test]
    fn sqlite_store_set_get_remove() {
        let store = SqliteKvStore::open_in_memory().unwrap();
        assert_eq!(store.get("a").unwrap(), None);
        store.set("a", "1").unwrap();
        store.set("a", "2").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("2"));
        store.remove("a").unwrap();
        assert_eq!(store.get("a").unwrap(), None);
    }

    #[test]
    fn sqlite_store_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("store.db");
        SqliteKvStore::open(&path).unwrap().set("k", "v").unwrap();
        let reopened = SqliteKvStore::open(&path).unwrap();
        assert_eq!(reopened.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn clear_drops_every_key() {
        let store = SqliteKvStore::open_in_memory().unwrap();
        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();
        store.clear().unwrap();
        assert_eq!(store.get("a").unwrap(), None);
        assert_eq!(store.get("b").unwrap(), None);
    }

    #[test]
    fn persistence_swallows_store_failures() {
        let p = Persistence::new(Box::new(BrokenStore));
        p.set("a", "1");
        p.remove("a");
        p.clear();
        assert_eq!(p.get("a"), None);
        assert_eq!(p.get_json::<Vec<u32>>("a"), None);
    }

    #[test]
    fn corrupt_json_reads_as_missing() {
        let p = Persistence::in_memory();
        p.set(keys::PRESETS, "[{broken");
        assert_eq!(p.get_json::<Vec<u32>>(keys::PRESETS), None);
    }

    #[test]
    fn json_roundtrip() {
        let p = Persistence::in_memory();
        p.set_json("nums", &vec![1u32, 2, 3]);
        assert_eq!(p.get_json::<Vec<u32>>("nums"), Some(vec![1, 2, 3]));
    }
}
