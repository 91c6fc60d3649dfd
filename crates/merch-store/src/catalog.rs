//! # Item Catalog
//!
//! Owns item records: validation, identity assignment, SKU derivation, and
//! persistence. Every successful mutation opportunistically refreshes the
//! offline cache for its scope; cache failures never block the primary
//! operation.
//!
//! Direct stock edits through [`ItemCatalog::update_item`] are allowed for
//! administrative correction but bypass ledger consistency - callers
//! performing sales must go through the sales ledger, never this path.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use merch_cache::OfflineCache;
use merch_core::sku::generate_sku;
use merch_core::{validation, Item, ItemDraft};

use crate::error::{StoreError, StoreResult};
use crate::store::RemoteStore;

/// Service for catalog operations.
#[derive(Clone)]
pub struct ItemCatalog {
    store: Arc<dyn RemoteStore>,
    cache: OfflineCache,
}

impl ItemCatalog {
    pub fn new(store: Arc<dyn RemoteStore>, cache: OfflineCache) -> Self {
        ItemCatalog { store, cache }
    }

    /// Creates an item from a draft.
    ///
    /// Validates the draft, assigns a UUID identity, derives the SKU when
    /// the draft carries none, stamps `updated_at`, and persists.
    ///
    /// ## Returns
    /// * `Ok(Item)` - the created item, with identity and SKU filled in
    /// * `Err(Validation(_))` - the draft broke a business rule; nothing
    ///   was persisted
    pub async fn add_item(&self, group_id: &str, draft: ItemDraft) -> StoreResult<Item> {
        validation::validate_item_draft(&draft)?;

        let id = Uuid::new_v4().to_string();
        let sku = draft.sku.clone().unwrap_or_else(|| {
            generate_sku(draft.category, draft.subcategory.as_deref(), &draft.name, &id)
        });

        let item = Item {
            id,
            group_id: group_id.to_string(),
            name: draft.name,
            description: draft.description,
            price: draft.price,
            cost: draft.cost,
            category: draft.category,
            subcategory: draft.subcategory,
            stock: draft.stock,
            low_stock_threshold: draft.low_stock_threshold,
            sku: Some(sku),
            image_refs: draft.image_refs,
            updated_at: Utc::now(),
        };

        info!(id = %item.id, name = %item.name, "Adding catalog item");
        self.store.put_item(&item).await?;
        self.refresh_cache(group_id).await;

        Ok(item)
    }

    /// Full replace keyed by identity; re-validates.
    ///
    /// Does NOT go through the stock transaction coordinator: this is the
    /// administrative correction path, and direct stock edits here bypass
    /// ledger consistency.
    pub async fn update_item(&self, item: Item) -> StoreResult<Item> {
        validation::validate_item(&item)?;

        if self.store.get_item(&item.id).await?.is_none() {
            return Err(StoreError::not_found("item", &item.id));
        }

        let mut item = item;
        item.updated_at = Utc::now();

        info!(id = %item.id, "Updating catalog item");
        self.store.put_item(&item).await?;
        self.refresh_cache(&item.group_id).await;

        Ok(item)
    }

    /// Hard delete; idempotent (deleting twice is a no-op, not an error).
    ///
    /// Outstanding sales referencing the item become orphaned and are
    /// tolerated by the ledger; reconciliation of their stock is out of
    /// scope for deletion.
    pub async fn delete_item(&self, item: &Item) -> StoreResult<()> {
        info!(id = %item.id, "Deleting catalog item");
        self.store.delete_item(&item.id).await?;
        self.refresh_cache(&item.group_id).await;
        Ok(())
    }

    /// Returns the current set of items for a scope.
    ///
    /// On success the offline cache is refreshed opportunistically. On a
    /// transient store failure the last cached snapshot is served instead,
    /// when one exists - the cache is a read fallback, never an authority
    /// for mutation.
    pub async fn fetch_items(&self, group_id: &str) -> StoreResult<Vec<Item>> {
        match self.store.items_in_group(group_id).await {
            Ok(items) => {
                self.cache.put_items(group_id, &items).await;
                Ok(items)
            }
            Err(StoreError::Transient(reason)) => {
                warn!(group_id = %group_id, reason = %reason, "Store unreachable; trying cache");
                match self.cache.get_items(group_id).await {
                    Some(snapshot) => {
                        info!(
                            group_id = %group_id,
                            stored_at = %snapshot.stored_at,
                            "Serving cached item snapshot"
                        );
                        Ok(snapshot.data)
                    }
                    None => Err(StoreError::Transient(reason)),
                }
            }
            Err(err) => Err(err),
        }
    }

    /// The low-stock report: items with some stock left but no more than
    /// their threshold. Out-of-stock items are a distinct state and are not
    /// included.
    pub async fn low_stock_items(&self, group_id: &str) -> StoreResult<Vec<Item>> {
        let items = self.fetch_items(group_id).await?;
        Ok(items.into_iter().filter(Item::is_low_stock).collect())
    }

    async fn refresh_cache(&self, group_id: &str) {
        match self.store.items_in_group(group_id).await {
            Ok(items) => self.cache.put_items(group_id, &items).await,
            Err(err) => {
                debug!(group_id = %group_id, error = %err, "Skipping cache refresh");
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::store::{VersionedItem, VersionedSale};
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use merch_cache::{CacheConfig, MemoryKv};
    use merch_core::{Category, Money, Sale, StockBySize, ValidationError};

    fn cache() -> OfflineCache {
        OfflineCache::new(MemoryKv::shared(), CacheConfig::default())
    }

    fn draft(name: &str) -> ItemDraft {
        ItemDraft {
            name: name.to_string(),
            description: "Soft cotton".to_string(),
            price: Money::from_cents(2000),
            cost: Some(Money::from_cents(700)),
            category: Category::Clothing,
            subcategory: Some("tshirt".to_string()),
            stock: StockBySize { s: 10, m: 5, l: 0, xl: 0, xxl: 0 },
            low_stock_threshold: 5,
            sku: None,
            image_refs: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_add_item_assigns_identity_and_sku() {
        let store = Arc::new(MemoryStore::new());
        let catalog = ItemCatalog::new(store.clone(), cache());

        let item = catalog.add_item("band", draft("Tour Tee")).await.unwrap();

        assert!(!item.id.is_empty());
        let sku = item.sku.clone().unwrap();
        assert!(sku.starts_with("CLTS-TOURTEE-"));

        let stored = store.get_item(&item.id).await.unwrap().unwrap();
        assert_eq!(stored.item, item);
    }

    #[tokio::test]
    async fn test_add_item_rejects_invalid_draft_without_persisting() {
        let store = Arc::new(MemoryStore::new());
        let catalog = ItemCatalog::new(store.clone(), cache());

        let mut bad = draft("Tour Tee");
        bad.price = Money::zero();
        let err = catalog.add_item("band", bad).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Validation(ValidationError::MustBePositive { field: "price" })
        ));

        assert!(store.items_in_group("band").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_item_is_full_replace() {
        let store = Arc::new(MemoryStore::new());
        let catalog = ItemCatalog::new(store.clone(), cache());

        let mut item = catalog.add_item("band", draft("Tour Tee")).await.unwrap();
        item.price = Money::from_cents(2500);
        item.stock.s = 99; // administrative stock correction

        let updated = catalog.update_item(item.clone()).await.unwrap();
        assert_eq!(updated.price, Money::from_cents(2500));

        let stored = store.get_item(&item.id).await.unwrap().unwrap();
        assert_eq!(stored.item.stock.s, 99);
    }

    #[tokio::test]
    async fn test_update_missing_item_is_not_found() {
        let catalog = ItemCatalog::new(Arc::new(MemoryStore::new()), cache());

        let d = draft("Ghost");
        let item = Item {
            id: "ghost".to_string(),
            group_id: "band".to_string(),
            name: d.name,
            description: d.description,
            price: d.price,
            cost: d.cost,
            category: d.category,
            subcategory: d.subcategory,
            stock: d.stock,
            low_stock_threshold: d.low_stock_threshold,
            sku: None,
            image_refs: d.image_refs,
            updated_at: Utc::now(),
        };
        let err = catalog.update_item(item).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_item_is_idempotent() {
        let store = Arc::new(MemoryStore::new());
        let catalog = ItemCatalog::new(store.clone(), cache());

        let item = catalog.add_item("band", draft("Tour Tee")).await.unwrap();
        catalog.delete_item(&item).await.unwrap();
        assert!(store.get_item(&item.id).await.unwrap().is_none());

        // Deleting twice is a no-op
        catalog.delete_item(&item).await.unwrap();
    }

    #[tokio::test]
    async fn test_fetch_items_refreshes_cache() {
        let store = Arc::new(MemoryStore::new());
        let shared_cache = cache();
        let catalog = ItemCatalog::new(store.clone(), shared_cache.clone());

        catalog.add_item("band", draft("Tour Tee")).await.unwrap();
        let items = catalog.fetch_items("band").await.unwrap();
        assert_eq!(items.len(), 1);

        let snapshot = shared_cache.get_items("band").await.unwrap();
        assert_eq!(snapshot.data, items);
    }

    #[tokio::test]
    async fn test_low_stock_report_excludes_out_of_stock() {
        let store = Arc::new(MemoryStore::new());
        let catalog = ItemCatalog::new(store, cache());

        let mut low = draft("Low Tee");
        low.stock = StockBySize::single(3);
        low.low_stock_threshold = 5;

        let mut healthy = draft("Healthy Tee");
        healthy.stock = StockBySize::single(50);
        healthy.low_stock_threshold = 5;

        let mut depleted = draft("Depleted Tee");
        depleted.stock = StockBySize::empty();
        depleted.low_stock_threshold = 5;

        catalog.add_item("band", low).await.unwrap();
        catalog.add_item("band", healthy).await.unwrap();
        catalog.add_item("band", depleted).await.unwrap();

        let report = catalog.low_stock_items("band").await.unwrap();
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].name, "Low Tee");
    }

    /// Store that fails every read with a transient error, to exercise the
    /// cache fallback path.
    struct Unreachable;

    #[async_trait]
    impl RemoteStore for Unreachable {
        async fn get_item(&self, _id: &str) -> StoreResult<Option<VersionedItem>> {
            Err(StoreError::Transient("connection refused".to_string()))
        }
        async fn put_item(&self, _item: &Item) -> StoreResult<()> {
            Err(StoreError::Transient("connection refused".to_string()))
        }
        async fn commit_item(&self, _item: &Item, _v: u64) -> StoreResult<()> {
            Err(StoreError::Transient("connection refused".to_string()))
        }
        async fn delete_item(&self, _id: &str) -> StoreResult<()> {
            Err(StoreError::Transient("connection refused".to_string()))
        }
        async fn items_in_group(&self, _group_id: &str) -> StoreResult<Vec<Item>> {
            Err(StoreError::Transient("connection refused".to_string()))
        }
        async fn insert_sale(&self, _sale: &Sale) -> StoreResult<()> {
            Err(StoreError::Transient("connection refused".to_string()))
        }
        async fn get_sale(&self, _id: &str) -> StoreResult<Option<VersionedSale>> {
            Err(StoreError::Transient("connection refused".to_string()))
        }
        async fn commit_sale(&self, _sale: &Sale, _v: u64) -> StoreResult<()> {
            Err(StoreError::Transient("connection refused".to_string()))
        }
        async fn sales_in_group(&self, _group_id: &str) -> StoreResult<Vec<Sale>> {
            Err(StoreError::Transient("connection refused".to_string()))
        }
        async fn sales_for_item(&self, _item_id: &str) -> StoreResult<Vec<Sale>> {
            Err(StoreError::Transient("connection refused".to_string()))
        }
        async fn sales_in_window(
            &self,
            _start: DateTime<Utc>,
            _end: DateTime<Utc>,
        ) -> StoreResult<Vec<Sale>> {
            Err(StoreError::Transient("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_fetch_items_falls_back_to_cache_when_unreachable() {
        let shared_cache = cache();

        // Warm the cache through a healthy store first.
        let healthy = Arc::new(MemoryStore::new());
        let catalog = ItemCatalog::new(healthy, shared_cache.clone());
        catalog.add_item("band", draft("Tour Tee")).await.unwrap();
        catalog.fetch_items("band").await.unwrap();

        // Same cache, unreachable store: the snapshot is served.
        let offline = ItemCatalog::new(Arc::new(Unreachable), shared_cache.clone());
        let items = offline.fetch_items("band").await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Tour Tee");

        // No snapshot for an unknown scope: the transient error surfaces.
        let err = offline.fetch_items("nobody").await.unwrap_err();
        assert!(matches!(err, StoreError::Transient(_)));
    }
}
