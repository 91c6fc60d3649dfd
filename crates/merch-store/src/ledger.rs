//! # Sales Ledger
//!
//! Owns sale records. Every stock mutation is delegated to the stock
//! transaction coordinator; the ledger itself never touches a counter.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  1. RECORD                                                             │
//! │     └── record_sale() → reserve stock → append Sale { Active }         │
//! │                                                                         │
//! │  2. (OPTIONAL) AMEND                                                   │
//! │     └── amend_sale() → net stock delta in ONE transaction              │
//! │         → replace size/quantity/channel after the stock commits        │
//! │                                                                         │
//! │  3. (OPTIONAL) CANCEL                                                  │
//! │     └── cancel_sale() → release stock → Sale { Voided }                │
//! │         second cancel → AlreadyVoided (idempotent rejection)           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Failure Semantics
//! No partial state is ever observable. When a step after a committed stock
//! mutation fails, the ledger compensates: a failed sale append releases
//! the reservation, a failed voiding commit re-reserves the released units.
//! `InsufficientStock` and `AlreadyVoided` are expected outcomes;
//! `Conflict` and `Transient` are retryable by re-issuing the whole
//! operation from fresh state.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use merch_cache::OfflineCache;
use merch_core::{validation, Money, Sale, SaleChannel, SaleStatus, Size};

use crate::coordinator::StockCoordinator;
use crate::error::{StoreError, StoreResult};
use crate::store::RemoteStore;

/// Service for ledger operations.
pub struct SalesLedger {
    store: Arc<dyn RemoteStore>,
    coordinator: StockCoordinator,
    cache: OfflineCache,
}

impl SalesLedger {
    pub fn new(store: Arc<dyn RemoteStore>, coordinator: StockCoordinator, cache: OfflineCache) -> Self {
        SalesLedger { store, coordinator, cache }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Records a sale: reserves stock, then appends an active sale dated
    /// now.
    ///
    /// ## Returns
    /// * `Ok(Sale)` - recorded; stock was decremented
    /// * `Err(InsufficientStock)` - no sale created, stock untouched
    /// * `Err(Conflict)` - retries exhausted; no sale created, stock
    ///   untouched; safe to re-issue
    pub async fn record_sale(
        &self,
        group_id: &str,
        item_id: &str,
        size: Size,
        quantity: i64,
        channel: SaleChannel,
    ) -> StoreResult<Sale> {
        validation::validate_quantity(quantity)?;

        self.coordinator.reserve(item_id, size, quantity).await?;

        let sale = Sale {
            id: Uuid::new_v4().to_string(),
            group_id: group_id.to_string(),
            item_id: item_id.to_string(),
            size,
            quantity,
            channel,
            date: Utc::now(),
            status: SaleStatus::Active,
        };

        if let Err(err) = self.store.insert_sale(&sale).await {
            // Compensate: the reservation committed but the sale did not.
            warn!(item_id = %item_id, error = %err, "Sale append failed; releasing reservation");
            if let Err(release_err) = self.coordinator.release(item_id, size, quantity).await {
                error!(
                    item_id = %item_id,
                    error = %release_err,
                    "Compensating release failed; stock left reserved without a sale"
                );
            }
            return Err(err);
        }

        info!(sale_id = %sale.id, item_id = %item_id, quantity, channel = %channel, "Sale recorded");
        self.refresh_cache(group_id).await;
        Ok(sale)
    }

    /// Cancels a sale: releases its stock, then transitions it to voided.
    ///
    /// Cancelling a non-active sale returns `AlreadyVoided` with no side
    /// effect - an idempotent rejection, not a silent success. If the
    /// release fails, the sale remains active and stock is untouched; if
    /// the voiding commit loses a version race, the released units are
    /// re-reserved before the conflict surfaces, so no partial state is
    /// observable.
    pub async fn cancel_sale(&self, sale_id: &str) -> StoreResult<Sale> {
        let versioned = self
            .store
            .get_sale(sale_id)
            .await?
            .ok_or_else(|| StoreError::not_found("sale", sale_id))?;

        let sale = versioned.sale;
        if !sale.is_active() {
            debug!(sale_id = %sale_id, "Cancel requested on non-active sale");
            return Err(StoreError::AlreadyVoided { sale_id: sale_id.to_string() });
        }

        self.coordinator
            .release(&sale.item_id, sale.size, sale.quantity)
            .await?;

        let mut voided = sale.clone();
        voided.status = SaleStatus::Voided;

        if let Err(err) = self.store.commit_sale(&voided, versioned.version).await {
            // Compensate: take the released units back before surfacing.
            warn!(sale_id = %sale_id, error = %err, "Voiding commit failed; re-reserving stock");
            if let Err(reserve_err) = self
                .coordinator
                .reserve(&sale.item_id, sale.size, sale.quantity)
                .await
            {
                error!(
                    sale_id = %sale_id,
                    error = %reserve_err,
                    "Compensating reserve failed; stock released for a still-active sale"
                );
            }
            return Err(err);
        }

        info!(sale_id = %sale_id, item_id = %sale.item_id, "Sale voided");
        self.refresh_cache(&sale.group_id).await;
        Ok(voided)
    }

    /// Amends a sale in place: the net stock delta (give back the old slot,
    /// take from the new one) is applied as a single stock transaction, and
    /// the sale's fields are replaced only after that adjustment commits.
    ///
    /// This replaces the void-then-re-record pattern, which leaves a window
    /// where stock is restored but no replacement sale exists.
    pub async fn amend_sale(
        &self,
        sale_id: &str,
        new_size: Size,
        new_quantity: i64,
        new_channel: SaleChannel,
    ) -> StoreResult<Sale> {
        validation::validate_quantity(new_quantity)?;

        let versioned = self
            .store
            .get_sale(sale_id)
            .await?
            .ok_or_else(|| StoreError::not_found("sale", sale_id))?;

        let sale = versioned.sale;
        if !sale.is_active() {
            return Err(StoreError::AlreadyVoided { sale_id: sale_id.to_string() });
        }

        let deltas = [(sale.size, sale.quantity), (new_size, -new_quantity)];
        self.coordinator.adjust(&sale.item_id, &deltas).await?;

        let mut amended = sale.clone();
        amended.size = new_size;
        amended.quantity = new_quantity;
        amended.channel = new_channel;

        if let Err(err) = self.store.commit_sale(&amended, versioned.version).await {
            // Compensate with the inverse delta.
            warn!(sale_id = %sale_id, error = %err, "Amend commit failed; reverting stock delta");
            let inverse = [(new_size, new_quantity), (sale.size, -sale.quantity)];
            if let Err(revert_err) = self.coordinator.adjust(&sale.item_id, &inverse).await {
                error!(
                    sale_id = %sale_id,
                    error = %revert_err,
                    "Compensating adjustment failed; stock reflects an uncommitted amendment"
                );
            }
            return Err(err);
        }

        info!(sale_id = %sale_id, quantity = new_quantity, "Sale amended");
        self.refresh_cache(&sale.group_id).await;
        Ok(amended)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Sales referencing an item, oldest first. Orphaned sales (deleted
    /// item) are returned like any other.
    pub async fn sales_for_item(&self, item_id: &str) -> StoreResult<Vec<Sale>> {
        self.store.sales_for_item(item_id).await
    }

    /// Sales dated within `[start, end)`, oldest first.
    pub async fn sales_in_window(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StoreResult<Vec<Sale>> {
        self.store.sales_in_window(start, end).await
    }

    /// Returns the current set of sales for a scope, refreshing the cache
    /// on success and falling back to the last snapshot on a transient
    /// failure - the mirror of the catalog's `fetch_items`.
    pub async fn fetch_sales(&self, group_id: &str) -> StoreResult<Vec<Sale>> {
        match self.store.sales_in_group(group_id).await {
            Ok(sales) => {
                self.cache.put_sales(group_id, &sales).await;
                Ok(sales)
            }
            Err(StoreError::Transient(reason)) => {
                warn!(group_id = %group_id, reason = %reason, "Store unreachable; trying cache");
                match self.cache.get_sales(group_id).await {
                    Some(snapshot) => Ok(snapshot.data),
                    None => Err(StoreError::Transient(reason)),
                }
            }
            Err(err) => Err(err),
        }
    }

    /// Aggregates the active sales of a scope within `[start, end)`.
    ///
    /// Revenue is computed against current item prices; gift sales reduce
    /// stock but contribute zero revenue. Sales whose item no longer exists
    /// count their units but contribute zero revenue.
    pub async fn sales_summary(
        &self,
        group_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StoreResult<SalesSummary> {
        let prices: HashMap<String, Money> = self
            .store
            .items_in_group(group_id)
            .await?
            .into_iter()
            .map(|item| (item.id, item.price))
            .collect();

        let mut summary = SalesSummary::default();
        for sale in self.store.sales_in_window(start, end).await? {
            if sale.group_id != group_id || !sale.is_active() {
                continue;
            }

            let revenue = match prices.get(&sale.item_id) {
                Some(price) => sale.revenue(*price),
                None => Money::zero(), // orphaned sale
            };

            summary.units_sold += sale.quantity;
            if sale.channel == SaleChannel::Gift {
                summary.gifted_units += sale.quantity;
            }
            summary.revenue += revenue;
            *summary.revenue_by_channel.entry(sale.channel).or_insert_with(Money::zero) += revenue;
        }

        Ok(summary)
    }

    async fn refresh_cache(&self, group_id: &str) {
        match self.store.sales_in_group(group_id).await {
            Ok(sales) => self.cache.put_sales(group_id, &sales).await,
            Err(err) => {
                debug!(group_id = %group_id, error = %err, "Skipping sales cache refresh");
            }
        }
    }
}

// =============================================================================
// Sales Summary
// =============================================================================

/// Window aggregate over active sales.
#[derive(Debug, Clone, Default)]
pub struct SalesSummary {
    /// Units sold across all channels, gifts included.
    pub units_sold: i64,

    /// Units given away on the gift channel.
    pub gifted_units: i64,

    /// Total revenue; gift sales contribute zero.
    pub revenue: Money,

    /// Revenue split by channel (the gift channel maps to zero).
    pub revenue_by_channel: HashMap<SaleChannel, Money>,
}

// =============================================================================
// Unit Tests
// =============================================================================
