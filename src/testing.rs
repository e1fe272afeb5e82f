//! Test utilities for database setup and store doubles.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;

use tempfile::TempDir;

use crate::db::{self, DbPool, KeyValueStore, StoreError};

/// Temporary directory with an initialized database.
///
/// The directory (and database file) is removed when dropped.
pub struct TestEnv {
    /// Temporary directory (kept alive for database file persistence)
    pub temp: TempDir,
    pub pool: DbPool,
}

impl TestEnv {
    pub fn new() -> rusqlite::Result<Self> {
        let temp =
            TempDir::new().map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
        let pool = db::init_db(&temp.path().join("ecg.db"))?;
        Ok(Self { temp, pool })
    }

    /// Get the temporary directory path for creating test files.
    pub fn path(&self) -> &Path {
        self.temp.path()
    }
}

/// In-memory store that remembers every write, for asserting persistence side effects.
#[derive(Default)]
pub struct MemoryStore {
    values: RefCell<HashMap<String, String>>,
    pub writes: RefCell<Vec<(String, String)>>,
    /// Make every `set` fail
    pub fail_writes: bool,
}

impl MemoryStore {
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub fn write_count(&self, key: &str) -> usize {
        self.writes.borrow().iter().filter(|(k, _)| k == key).count()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::Unavailable);
        }
        self.writes.borrow_mut().push((key.to_string(), value.to_string()));
        self.values.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }
}
