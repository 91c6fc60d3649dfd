//! # Cache Error Types
//!
//! Failures of the offline cache. These never propagate into a primary
//! operation: the public cache API logs them at `warn` and swallows them,
//! because the cache is a non-authoritative optimization.

use thiserror::Error;

/// Offline cache failures.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Snapshot or index (de)serialization failed.
    #[error("cache serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backing key-value store failed (connection, quota, corruption).
    #[error("cache storage failure: {0}")]
    Storage(String),

    /// The cache configuration is unusable.
    #[error("invalid cache config: {0}")]
    InvalidConfig(String),
}

impl From<sqlx::Error> for CacheError {
    fn from(err: sqlx::Error) -> Self {
        CacheError::Storage(err.to_string())
    }
}

impl From<std::io::Error> for CacheError {
    fn from(err: std::io::Error) -> Self {
        CacheError::Storage(err.to_string())
    }
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;
