//! Per-visitor key/value storage.
//!
//! Every visitor (identified by cookie) gets its own string namespace, the
//! way a browser origin gets its own local storage.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;

/// Errors from the key/value store.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    #[error("database unavailable")]
    Unavailable,
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

/// String keys to string values, scoped to one visitor.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// `KeyValueStore` backed by the `kv_store` table.
pub struct SqliteStore<'a> {
    conn: &'a Connection,
    visitor_id: &'a str,
}

impl<'a> SqliteStore<'a> {
    pub fn new(conn: &'a Connection, visitor_id: &'a str) -> Self {
        Self { conn, visitor_id }
    }

    /// All keys starting with `prefix`, with values.
    pub fn entries_with_prefix(&self, prefix: &str) -> Result<Vec<(String, String)>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT key, value FROM kv_store
             WHERE visitor_id = ?1 AND substr(key, 1, length(?2)) = ?2
             ORDER BY key",
        )?;
        let rows = stmt
            .query_map(params![self.visitor_id, prefix], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}

impl KeyValueStore for SqliteStore<'_> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE visitor_id = ?1 AND key = ?2",
                params![self.visitor_id, key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO kv_store (visitor_id, key, value, updated_at) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(visitor_id, key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![self.visitor_id, key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}
