//! # Remote Store Seam
//!
//! The contract the core expects from the remote document store: versioned
//! item and sale documents with per-document compare-and-swap commits.
//!
//! ## Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Versioned Document Contract                        │
//! │                                                                         │
//! │  get_item("a")        → (Item, version 4)                               │
//! │                                                                         │
//! │  commit_item(item, 4) → Ok           version now 5                      │
//! │  commit_item(item, 4) → Conflict     someone committed in between       │
//! │                                                                         │
//! │  The store linearizes read-modify-write per document. Granularity is    │
//! │  per-item: two sizes of one item share a version, two items do not.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! This seam is the correctness foundation of the stock transaction
//! coordinator: conflict detection here is what turns its read-check-write
//! loop into an atomic unit of work.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use merch_core::{Item, Sale};

use crate::error::StoreResult;

// =============================================================================
// Versioned Documents
// =============================================================================

/// An item document together with the version its read observed.
#[derive(Debug, Clone)]
pub struct VersionedItem {
    pub item: Item,
    pub version: u64,
}

/// A sale document together with the version its read observed.
#[derive(Debug, Clone)]
pub struct VersionedSale {
    pub sale: Sale,
    pub version: u64,
}

// =============================================================================
// Remote Store Trait
// =============================================================================

/// Per-document transactional access to the remote store.
///
/// Implementations must provide linearizable read-modify-write on a single
/// document with conflict detection: `commit_*` with a stale
/// `expected_version` fails with [`crate::StoreError::Conflict`] and leaves
/// the document untouched. Network-level failures surface as
/// [`crate::StoreError::Transient`].
#[async_trait]
pub trait RemoteStore: Send + Sync {
    // -------------------------------------------------------------------------
    // Items
    // -------------------------------------------------------------------------

    /// Reads an item document with its current version.
    async fn get_item(&self, id: &str) -> StoreResult<Option<VersionedItem>>;

    /// Unconditionally creates or replaces an item document (catalog path;
    /// bypasses version checks by design - administrative correction).
    async fn put_item(&self, item: &Item) -> StoreResult<()>;

    /// Replaces an item document iff its version still matches.
    ///
    /// ## Returns
    /// * `Ok(())` - committed, version bumped
    /// * `Err(Conflict)` - another transaction committed in between
    /// * `Err(NotFound)` - the document vanished since the read
    async fn commit_item(&self, item: &Item, expected_version: u64) -> StoreResult<()>;

    /// Hard-deletes an item document. Deleting an absent document is a
    /// no-op, making catalog deletion idempotent.
    async fn delete_item(&self, id: &str) -> StoreResult<()>;

    /// Lists the items of a scope, ordered by name.
    async fn items_in_group(&self, group_id: &str) -> StoreResult<Vec<Item>>;

    // -------------------------------------------------------------------------
    // Sales
    // -------------------------------------------------------------------------

    /// Appends a new sale document at version 1.
    async fn insert_sale(&self, sale: &Sale) -> StoreResult<()>;

    /// Reads a sale document with its current version.
    async fn get_sale(&self, id: &str) -> StoreResult<Option<VersionedSale>>;

    /// Replaces a sale document iff its version still matches (used for the
    /// active → voided transition and for atomic amendment).
    async fn commit_sale(&self, sale: &Sale, expected_version: u64) -> StoreResult<()>;

    /// Lists the sales of a scope, ordered by date.
    async fn sales_in_group(&self, group_id: &str) -> StoreResult<Vec<Sale>>;

    /// Lists the sales referencing an item, ordered by date. Orphaned sales
    /// (item deleted) are still returned.
    async fn sales_for_item(&self, item_id: &str) -> StoreResult<Vec<Sale>>;

    /// Lists the sales dated within `[start, end)`, ordered by date.
    async fn sales_in_window(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StoreResult<Vec<Sale>>;
}
