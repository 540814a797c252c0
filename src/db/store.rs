//! Key-value storage for preferences.
//!
//! Values are opaque strings with no schema versioning. The `SQLite` store
//! is the production backend; the in-memory store backs tests and runs
//! without a database.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use sqlx::SqlitePool;

#[derive(Debug, thiserror::Error)]
pub enum PrefsError {
    #[error("preferences storage failed: {0}")]
    Storage(#[from] sqlx::Error),
}

impl crate::frame::ErrorCode for PrefsError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Storage(_) => "E_PREFS_STORAGE",
        }
    }

    fn retryable(&self) -> bool {
        true
    }
}

/// Async key-value store. Enables mocking in tests.
#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Insert or overwrite. Last write wins.
    async fn set(&self, key: &str, value: &str) -> Result<(), PrefsError>;

    async fn remove(&self, key: &str) -> Result<(), PrefsError>;

    /// Every stored pair, ordered by key.
    async fn all(&self) -> Result<Vec<(String, String)>, PrefsError>;
}

// =============================================================================
// SQLITE
// =============================================================================

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl KeyValueStore for SqliteStore {
    async fn set(&self, key: &str, value: &str) -> Result<(), PrefsError> {
        sqlx::query(
            "INSERT INTO preferences (key, value) VALUES (?, ?) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = strftime('%s', 'now')",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), PrefsError> {
        sqlx::query("DELETE FROM preferences WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn all(&self) -> Result<Vec<(String, String)>, PrefsError> {
        let rows: Vec<(String, String)> = sqlx::query_as("SELECT key, value FROM preferences ORDER BY key")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

// =============================================================================
// IN-MEMORY
// =============================================================================

#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl KeyValueStore for MemoryStore {
    async fn set(&self, key: &str, value: &str) -> Result<(), PrefsError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), PrefsError> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).remove(key);
        Ok(())
    }

    async fn all(&self) -> Result<Vec<(String, String)>, PrefsError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
