use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use rusqlite::OptionalExtension;

use crate::Database;

/// Durable key-value persistence port. Business logic only ever sees this
/// trait; the concrete backing (SQLite file, in-memory map) is wired up at
/// startup. Values are JSON or plain strings, mirroring the key layout the
/// web client kept in browser local storage.
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn delete(&self, key: &str) -> Result<()>;
}

/// SQLite-backed adapter over the shared [`Database`] handle.
pub struct SqliteKv {
    db: Arc<Database>,
}

impl SqliteKv {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

impl KvStore for SqliteKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.db.with_conn(|conn| {
            let value = conn
                .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| {
                    row.get(0)
                })
                .optional()?;
            Ok(value)
        })
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
                 ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
                (key, value),
            )?;
            Ok(())
        })
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.db.with_conn(|conn| {
            conn.execute("DELETE FROM kv WHERE key = ?1", [key])?;
            Ok(())
        })
    }
}

/// In-memory adapter for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryKv {
    map: Mutex<HashMap<String, String>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let map = self
            .map
            .lock()
            .map_err(|e| anyhow::anyhow!("KV lock poisoned: {}", e))?;
        Ok(map.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut map = self
            .map
            .lock()
            .map_err(|e| anyhow::anyhow!("KV lock poisoned: {}", e))?;
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        let mut map = self
            .map
            .lock()
            .map_err(|e| anyhow::anyhow!("KV lock poisoned: {}", e))?;
        map.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_roundtrip(kv: &dyn KvStore) {
        assert_eq!(kv.get("cosmicMessages").unwrap(), None);

        kv.set("cosmicMessages", "[]").unwrap();
        assert_eq!(kv.get("cosmicMessages").unwrap().as_deref(), Some("[]"));

        // Overwrite
        kv.set("cosmicMessages", "[1]").unwrap();
        assert_eq!(kv.get("cosmicMessages").unwrap().as_deref(), Some("[1]"));

        // Delete is idempotent
        kv.delete("cosmicMessages").unwrap();
        kv.delete("cosmicMessages").unwrap();
        assert_eq!(kv.get("cosmicMessages").unwrap(), None);
    }

    #[test]
    fn sqlite_kv_roundtrip() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        check_roundtrip(&SqliteKv::new(db));
    }

    #[test]
    fn memory_kv_roundtrip() {
        check_roundtrip(&MemoryKv::new());
    }
}
