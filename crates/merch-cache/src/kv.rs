//! # Key-Value Backends
//!
//! The local key-value seam the offline cache sits on: get / put / delete /
//! enumerate-by-prefix, no transactional requirement. Two backends are
//! provided: an in-memory map (tests, reference) and SQLite via sqlx.

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::CacheResult;

// =============================================================================
// Key-Value Seam
// =============================================================================

/// Simple string-keyed local storage.
///
/// Implementations must be cheap to share (`Arc<dyn KeyValueStore>`); the
/// cache never assumes atomicity across calls.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the value for `key`, or `None` when absent.
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Inserts or replaces the value for `key`.
    async fn put(&self, key: &str, value: &str) -> CacheResult<()>;

    /// Removes `key`; removing an absent key is a no-op.
    async fn delete(&self, key: &str) -> CacheResult<()>;

    /// Returns every key starting with `prefix`.
    async fn keys_with_prefix(&self, prefix: &str) -> CacheResult<Vec<String>>;
}

// =============================================================================
// In-Memory Backend
// =============================================================================

/// HashMap-backed key-value store for tests and ephemeral deployments.
#[derive(Debug, Default)]
pub struct MemoryKv {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience constructor returning the shared handle form the cache
    /// expects.
    pub fn shared() -> Arc<dyn KeyValueStore> {
        Arc::new(Self::new())
    }
}

#[async_trait]
impl KeyValueStore for MemoryKv {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> CacheResult<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn keys_with_prefix(&self, prefix: &str) -> CacheResult<Vec<String>> {
        let mut keys: Vec<String> = self
            .entries
            .read()
            .await
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }
}

// =============================================================================
// SQLite Backend
// =============================================================================

/// SQLite-backed key-value store.
///
/// A single `kv_entries` table keyed by `key`; WAL mode with a busy timeout.
/// The pool is capped at one connection - SQLite permits limited write
/// concurrency, and a single connection avoids persistent "database is
/// locked" failures under concurrent cache traffic.
#[derive(Debug, Clone)]
pub struct SqliteKv {
    pool: SqlitePool,
}

impl SqliteKv {
    /// Opens (creating if missing) a key-value database at `path`.
    pub async fn open(path: impl AsRef<Path>) -> CacheResult<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", path.display()))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5));

        Self::connect(options).await
    }

    /// Opens an in-memory database (each call gets a fresh one).
    pub async fn in_memory() -> CacheResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        Self::connect(options).await
    }

    async fn connect(options: SqliteConnectOptions) -> CacheResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS kv_entries (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await?;

        debug!("SQLite key-value store ready");
        Ok(SqliteKv { pool })
    }
}

#[async_trait]
impl KeyValueStore for SqliteKv {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let row = sqlx::query("SELECT value FROM kv_entries WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(row.try_get("value")?)),
            None => Ok(None),
        }
    }

    async fn put(&self, key: &str, value: &str) -> CacheResult<()> {
        sqlx::query(
            r#"
            INSERT INTO kv_entries (key, value)
            VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        sqlx::query("DELETE FROM kv_entries WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn keys_with_prefix(&self, prefix: &str) -> CacheResult<Vec<String>> {
        // Escape LIKE wildcards so "items:" style prefixes match literally.
        let escaped = prefix.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
        let pattern = format!("{escaped}%");

        let rows = sqlx::query("SELECT key FROM kv_entries WHERE key LIKE ?1 ESCAPE '\\' ORDER BY key")
            .bind(&pattern)
            .fetch_all(&self.pool)
            .await?;

        let mut keys = Vec::with_capacity(rows.len());
        for row in rows {
            keys.push(row.try_get("key")?);
        }
        Ok(keys)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    async fn exercise_backend(kv: &dyn KeyValueStore) {
        assert_eq!(kv.get("items:band").await.unwrap(), None);

        kv.put("items:band", "[1]").await.unwrap();
        kv.put("sales:band", "[2]").await.unwrap();
        kv.put("meta:total_bytes", "4").await.unwrap();

        assert_eq!(kv.get("items:band").await.unwrap().as_deref(), Some("[1]"));

        kv.put("items:band", "[1,2]").await.unwrap();
        assert_eq!(kv.get("items:band").await.unwrap().as_deref(), Some("[1,2]"));

        let keys = kv.keys_with_prefix("items:").await.unwrap();
        assert_eq!(keys, vec!["items:band".to_string()]);

        let all = kv.keys_with_prefix("").await.unwrap();
        assert_eq!(all.len(), 3);

        kv.delete("items:band").await.unwrap();
        assert_eq!(kv.get("items:band").await.unwrap(), None);

        // Deleting an absent key is a no-op
        kv.delete("items:band").await.unwrap();
    }

    #[tokio::test]
    async fn test_memory_backend() {
        let kv = MemoryKv::new();
        exercise_backend(&kv).await;
    }

    #[tokio::test]
    async fn test_sqlite_backend() {
        let kv = SqliteKv::in_memory().await.unwrap();
        exercise_backend(&kv).await;
    }
}
