//! # In-Memory Remote Store
//!
//! Reference implementation of the [`RemoteStore`] contract over shared
//! maps. Used by every test in the workspace; a production backend must
//! match its versioned CAS semantics.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use merch_core::{Item, Sale};

use crate::error::{StoreError, StoreResult};
use crate::store::{RemoteStore, VersionedItem, VersionedSale};

/// Map-backed store with per-document version counters.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RwLock<HashMap<String, (Item, u64)>>,
    sales: RwLock<HashMap<String, (Sale, u64)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn get_item(&self, id: &str) -> StoreResult<Option<VersionedItem>> {
        Ok(self
            .items
            .read()
            .await
            .get(id)
            .map(|(item, version)| VersionedItem { item: item.clone(), version: *version }))
    }

    async fn put_item(&self, item: &Item) -> StoreResult<()> {
        let mut items = self.items.write().await;
        let version = items.get(&item.id).map(|(_, v)| v + 1).unwrap_or(1);
        items.insert(item.id.clone(), (item.clone(), version));
        Ok(())
    }

    async fn commit_item(&self, item: &Item, expected_version: u64) -> StoreResult<()> {
        let mut items = self.items.write().await;
        match items.get(&item.id) {
            None => Err(StoreError::not_found("item", &item.id)),
            Some((_, version)) if *version != expected_version => {
                Err(StoreError::Conflict { id: item.id.clone() })
            }
            Some(_) => {
                items.insert(item.id.clone(), (item.clone(), expected_version + 1));
                Ok(())
            }
        }
    }

    async fn delete_item(&self, id: &str) -> StoreResult<()> {
        self.items.write().await.remove(id);
        Ok(())
    }

    async fn items_in_group(&self, group_id: &str) -> StoreResult<Vec<Item>> {
        let mut items: Vec<Item> = self
            .items
            .read()
            .await
            .values()
            .filter(|(item, _)| item.group_id == group_id)
            .map(|(item, _)| item.clone())
            .collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    async fn insert_sale(&self, sale: &Sale) -> StoreResult<()> {
        self.sales
            .write()
            .await
            .insert(sale.id.clone(), (sale.clone(), 1));
        Ok(())
    }

    async fn get_sale(&self, id: &str) -> StoreResult<Option<VersionedSale>> {
        Ok(self
            .sales
            .read()
            .await
            .get(id)
            .map(|(sale, version)| VersionedSale { sale: sale.clone(), version: *version }))
    }

    async fn commit_sale(&self, sale: &Sale, expected_version: u64) -> StoreResult<()> {
        let mut sales = self.sales.write().await;
        match sales.get(&sale.id) {
            None => Err(StoreError::not_found("sale", &sale.id)),
            Some((_, version)) if *version != expected_version => {
                Err(StoreError::Conflict { id: sale.id.clone() })
            }
            Some(_) => {
                sales.insert(sale.id.clone(), (sale.clone(), expected_version + 1));
                Ok(())
            }
        }
    }

    async fn sales_in_group(&self, group_id: &str) -> StoreResult<Vec<Sale>> {
        let mut sales: Vec<Sale> = self
            .sales
            .read()
            .await
            .values()
            .filter(|(sale, _)| sale.group_id == group_id)
            .map(|(sale, _)| sale.clone())
            .collect();
        sales.sort_by_key(|sale| sale.date);
        Ok(sales)
    }

    async fn sales_for_item(&self, item_id: &str) -> StoreResult<Vec<Sale>> {
        let mut sales: Vec<Sale> = self
            .sales
            .read()
            .await
            .values()
            .filter(|(sale, _)| sale.item_id == item_id)
            .map(|(sale, _)| sale.clone())
            .collect();
        sales.sort_by_key(|sale| sale.date);
        Ok(sales)
    }

    async fn sales_in_window(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StoreResult<Vec<Sale>> {
        let mut sales: Vec<Sale> = self
            .sales
            .read()
            .await
            .values()
            .filter(|(sale, _)| sale.date >= start && sale.date < end)
            .map(|(sale, _)| sale.clone())
            .collect();
        sales.sort_by_key(|sale| sale.date);
        Ok(sales)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use merch_core::{Category, Money, SaleChannel, SaleStatus, Size, StockBySize};

    fn item(id: &str) -> Item {
        Item {
            id: id.to_string(),
            group_id: "band".to_string(),
            name: format!("Item {id}"),
            description: String::new(),
            price: Money::from_cents(2000),
            cost: None,
            category: Category::Clothing,
            subcategory: Some("tshirt".to_string()),
            stock: StockBySize::single(5),
            low_stock_threshold: 2,
            sku: None,
            image_refs: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_put_assigns_and_bumps_versions() {
        let store = MemoryStore::new();
        store.put_item(&item("a")).await.unwrap();
        assert_eq!(store.get_item("a").await.unwrap().unwrap().version, 1);

        store.put_item(&item("a")).await.unwrap();
        assert_eq!(store.get_item("a").await.unwrap().unwrap().version, 2);
    }

    #[tokio::test]
    async fn test_commit_detects_version_conflicts() {
        let store = MemoryStore::new();
        store.put_item(&item("a")).await.unwrap();

        let read = store.get_item("a").await.unwrap().unwrap();
        store.commit_item(&read.item, read.version).await.unwrap();

        // Same expected version again: the first commit invalidated it.
        let err = store.commit_item(&read.item, read.version).await.unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_commit_on_missing_item_is_not_found() {
        let store = MemoryStore::new();
        let err = store.commit_item(&item("ghost"), 1).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = MemoryStore::new();
        store.put_item(&item("a")).await.unwrap();

        store.delete_item("a").await.unwrap();
        assert!(store.get_item("a").await.unwrap().is_none());

        // Second delete: no-op, not an error
        store.delete_item("a").await.unwrap();
    }

    #[tokio::test]
    async fn test_items_in_group_is_scoped_and_sorted() {
        let store = MemoryStore::new();
        let mut b = item("b");
        b.name = "Zebra Hoodie".to_string();
        let mut a = item("a");
        a.name = "Anchor Tee".to_string();
        let mut other = item("c");
        other.group_id = "someone-else".to_string();

        store.put_item(&b).await.unwrap();
        store.put_item(&a).await.unwrap();
        store.put_item(&other).await.unwrap();

        let items = store.items_in_group("band").await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "Anchor Tee");
        assert_eq!(items[1].name, "Zebra Hoodie");
    }

    #[tokio::test]
    async fn test_sales_window_is_half_open() {
        let store = MemoryStore::new();
        let base = Utc::now();

        for (i, offset) in [0i64, 60, 120].iter().enumerate() {
            let sale = Sale {
                id: format!("sale-{i}"),
                group_id: "band".to_string(),
                item_id: "a".to_string(),
                size: Size::S,
                quantity: 1,
                channel: SaleChannel::Online,
                date: base + chrono::Duration::seconds(*offset),
                status: SaleStatus::Active,
            };
            store.insert_sale(&sale).await.unwrap();
        }

        let window = store
            .sales_in_window(base, base + chrono::Duration::seconds(120))
            .await
            .unwrap();
        assert_eq!(window.len(), 2);
        assert_eq!(window[0].id, "sale-0");
        assert_eq!(window[1].id, "sale-1");
    }
}
