//! # merch-cache: Offline Snapshot Cache
//!
//! A size-bounded, periodically-swept local snapshot store for items and
//! sales, used as a read fallback when the remote store is unreachable -
//! never as a source of truth for mutation.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Offline Cache Data Flow                          │
//! │                                                                         │
//! │  merch-store (catalog / ledger)                                        │
//! │       │  opportunistic refresh after mutations and reads               │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   merch-cache (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │ OfflineCache  │    │ KeyValueStore │    │ CacheConfig  │  │   │
//! │  │   │  (cache.rs)   │    │   (kv.rs)     │    │ (config.rs)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ LRU eviction  │◄───│ MemoryKv      │    │ 50 MB bound  │  │   │
//! │  │   │ size bound    │    │ SqliteKv      │    │ 7 day sweep  │  │   │
//! │  │   │ sweep clock   │    │               │    │ env override │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  The cache is eventually consistent and may lag arbitrarily. It is     │
//! │  never consulted for a stock-decrementing decision.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`cache`] - The snapshot cache (envelopes, LRU index, cleanup)
//! - [`kv`] - Key-value seam with memory and SQLite backends
//! - [`config`] - Size bound and sweep interval configuration
//! - [`error`] - Cache error types (logged and swallowed)

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cache;
pub mod config;
pub mod error;
pub mod kv;

// =============================================================================
// Re-exports
// =============================================================================

pub use cache::{OfflineCache, Snapshot};
pub use config::CacheConfig;
pub use error::{CacheError, CacheResult};
pub use kv::{KeyValueStore, MemoryKv, SqliteKv};
