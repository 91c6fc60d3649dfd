//! # Stock Transaction Coordinator
//!
//! Makes "read current stock, check a precondition, write new stock" appear
//! atomic with respect to other concurrent instances of the same operation
//! on the same item, when the only shared substrate is a remote store with
//! per-document transactional semantics (not an in-process lock).
//!
//! ## Algorithm
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  Optimistic Stock Transaction                           │
//! │                                                                         │
//! │  attempt 1..=max_attempts:                                             │
//! │    1. read item document (observes version V)                          │
//! │    2. apply deltas to the size counters                                │
//! │       └── any counter would go negative → InsufficientStock, stop      │
//! │    3. commit-if-version-still-V                                        │
//! │       ├── Ok        → done                                              │
//! │       └── Conflict  → another transaction won the race; go to 1        │
//! │                                                                         │
//! │  attempts exhausted → Conflict surfaces to the caller                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Granularity is per-item: two concurrent sales against different sizes of
//! the same item still serialize through this loop. No caller-visible
//! intermediate state exists; an operation either fully commits or fully
//! fails.
//!
//! This coordinator is the only component permitted to mutate stock
//! counters once an item exists. All other stock-affecting call paths are
//! funneled through it.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use merch_core::{Item, Size};

use crate::error::{StoreError, StoreResult};
use crate::store::RemoteStore;

/// Bounded retry count for version conflicts.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Serializer of concurrent stock mutations on a single item.
pub struct StockCoordinator {
    store: Arc<dyn RemoteStore>,
    max_attempts: u32,
}

impl StockCoordinator {
    /// Creates a coordinator with the default retry bound.
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self::with_max_attempts(store, DEFAULT_MAX_ATTEMPTS)
    }

    /// Creates a coordinator with an explicit retry bound (tests crank this
    /// up to make contention outcomes exact).
    pub fn with_max_attempts(store: Arc<dyn RemoteStore>, max_attempts: u32) -> Self {
        StockCoordinator { store, max_attempts: max_attempts.max(1) }
    }

    /// Decrements a size counter by `quantity`, failing with
    /// `InsufficientStock` when fewer units remain.
    ///
    /// ## Returns
    /// The item as committed, for callers that want the post-transaction
    /// stock level.
    pub async fn reserve(&self, item_id: &str, size: Size, quantity: i64) -> StoreResult<Item> {
        self.apply(item_id, &[(size, -quantity)]).await
    }

    /// Increments a size counter by `quantity`. The inverse of
    /// [`reserve`](Self::reserve): incrementing is always legal, so this
    /// cannot fail on precondition, but it still retries on conflict.
    pub async fn release(&self, item_id: &str, size: Size, quantity: i64) -> StoreResult<Item> {
        self.apply(item_id, &[(size, quantity)]).await
    }

    /// Applies a net multi-slot delta in one unit of work (used for atomic
    /// sale amendment: restore the old slot, take from the new one, same
    /// transaction).
    pub async fn adjust(&self, item_id: &str, deltas: &[(Size, i64)]) -> StoreResult<Item> {
        self.apply(item_id, deltas).await
    }

    async fn apply(&self, item_id: &str, deltas: &[(Size, i64)]) -> StoreResult<Item> {
        for attempt in 1..=self.max_attempts {
            let versioned = self
                .store
                .get_item(item_id)
                .await?
                .ok_or_else(|| StoreError::not_found("item", item_id))?;

            let mut item = versioned.item;
            for &(size, delta) in deltas {
                let current = item.stock.get(size);
                let next = current + delta;
                if next < 0 {
                    debug!(
                        item_id = %item_id,
                        size = %size,
                        available = current,
                        requested = -delta,
                        "Stock precondition failed"
                    );
                    return Err(StoreError::InsufficientStock {
                        item_id: item_id.to_string(),
                        size,
                        available: current,
                        requested: -delta,
                    });
                }
                item.stock.set(size, next);
            }
            item.updated_at = Utc::now();

            match self.store.commit_item(&item, versioned.version).await {
                Ok(()) => {
                    debug!(item_id = %item_id, attempt, "Stock transaction committed");
                    return Ok(item);
                }
                Err(err) if err.is_conflict() => {
                    debug!(item_id = %item_id, attempt, "Stock transaction conflicted; retrying");
                    continue;
                }
                Err(err) => return Err(err),
            }
        }

        warn!(
            item_id = %item_id,
            attempts = self.max_attempts,
            "Stock transaction retries exhausted"
        );
        Err(StoreError::Conflict { id: item_id.to_string() })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
