//! # Offline Snapshot Cache
//!
//! A size-bounded local snapshot store keyed by scope, holding serialized
//! items and sales for read-only fallback when the remote store is
//! unreachable.
//!
//! ## Entry Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Key-Value Layout                                  │
//! │                                                                         │
//! │  items:<scope>      Envelope { stored_at, bytes, payload }             │
//! │  sales:<scope>      Envelope { stored_at, bytes, payload }             │
//! │                                                                         │
//! │  meta:last_cleanup  RFC 3339 timestamp of the last cleanup             │
//! │  meta:total_bytes   running byte estimate of all data entries         │
//! │  meta:lru           { key → last-access unix millis }                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Cleanup Policy
//! Cleanup runs when the byte estimate exceeds the configured maximum, or
//! when the sweep interval has elapsed since the last cleanup. It evicts
//! roughly half of all data entries in least-recently-accessed order (the
//! explicit `meta:lru` index), then recomputes the byte estimate.
//!
//! ## Failure Policy
//! The cache is strictly a non-authoritative optimization: every public
//! operation swallows its own failures after logging them. A primary
//! operation never fails because of cache health.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

use merch_core::{Item, Sale};

use crate::config::CacheConfig;
use crate::error::CacheResult;
use crate::kv::KeyValueStore;

// =============================================================================
// Key Constants
// =============================================================================

const ITEMS_PREFIX: &str = "items:";
const SALES_PREFIX: &str = "sales:";
const LAST_CLEANUP_KEY: &str = "meta:last_cleanup";
const TOTAL_BYTES_KEY: &str = "meta:total_bytes";
const LRU_INDEX_KEY: &str = "meta:lru";

// =============================================================================
// Snapshot Envelope
// =============================================================================

/// Stored form of one cache entry: the serialized payload plus bookkeeping.
#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    stored_at: DateTime<Utc>,
    bytes: u64,
    payload: String,
}

/// A snapshot handed back to readers, with its age attached so callers can
/// judge staleness. The cache may lag the remote store arbitrarily.
#[derive(Debug, Clone)]
pub struct Snapshot<T> {
    pub data: T,
    pub stored_at: DateTime<Utc>,
}

// =============================================================================
// Offline Cache
// =============================================================================

/// Scope-keyed snapshot store over a [`KeyValueStore`] backend.
///
/// Cloning is cheap; clones share the backend.
#[derive(Clone)]
pub struct OfflineCache {
    kv: Arc<dyn KeyValueStore>,
    config: CacheConfig,
}

impl OfflineCache {
    pub fn new(kv: Arc<dyn KeyValueStore>, config: CacheConfig) -> Self {
        OfflineCache { kv, config }
    }

    // =========================================================================
    // Snapshot API (infallible at the call site)
    // =========================================================================

    /// Caches the item snapshot for a scope.
    pub async fn put_items(&self, scope: &str, items: &[Item]) {
        self.put(ITEMS_PREFIX, scope, items).await;
    }

    /// Returns the last cached item snapshot for a scope, or absent.
    pub async fn get_items(&self, scope: &str) -> Option<Snapshot<Vec<Item>>> {
        self.get(ITEMS_PREFIX, scope).await
    }

    /// Caches the sale snapshot for a scope.
    pub async fn put_sales(&self, scope: &str, sales: &[Sale]) {
        self.put(SALES_PREFIX, scope, sales).await;
    }

    /// Returns the last cached sale snapshot for a scope, or absent.
    pub async fn get_sales(&self, scope: &str) -> Option<Snapshot<Vec<Sale>>> {
        self.get(SALES_PREFIX, scope).await
    }

    /// Removes both snapshots for a scope.
    pub async fn clear(&self, scope: &str) {
        if let Err(err) = self.try_clear(scope).await {
            warn!(scope = %scope, error = %err, "Failed to clear cache scope");
        }
    }

    /// Removes every cache entry, including bookkeeping.
    pub async fn clear_all(&self) {
        if let Err(err) = self.try_clear_all().await {
            warn!(error = %err, "Failed to clear cache");
        }
    }

    /// The current running byte estimate.
    pub async fn approximate_size(&self) -> u64 {
        self.read_total_bytes().await.unwrap_or(0)
    }

    // =========================================================================
    // Internal: fallible paths wrapped by the public API
    // =========================================================================

    async fn put<T: Serialize + ?Sized>(&self, prefix: &str, scope: &str, value: &T) {
        if let Err(err) = self.try_put(prefix, scope, value).await {
            warn!(scope = %scope, error = %err, "Cache write failed; continuing without cache");
        }
    }

    async fn get<T: DeserializeOwned>(&self, prefix: &str, scope: &str) -> Option<Snapshot<T>> {
        match self.try_get(prefix, scope).await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(scope = %scope, error = %err, "Cache read failed; treating as absent");
                None
            }
        }
    }

    async fn try_put<T: Serialize + ?Sized>(
        &self,
        prefix: &str,
        scope: &str,
        value: &T,
    ) -> CacheResult<()> {
        let key = format!("{prefix}{scope}");
        let payload = serde_json::to_string(value)?;

        let old_bytes = match self.read_envelope(&key).await? {
            Some(envelope) => envelope.bytes,
            None => 0,
        };

        let envelope = Envelope {
            stored_at: Utc::now(),
            bytes: payload.len() as u64,
            payload,
        };
        let new_bytes = envelope.bytes;

        self.kv.put(&key, &serde_json::to_string(&envelope)?).await?;

        let total = self
            .read_total_bytes()
            .await?
            .saturating_sub(old_bytes)
            .saturating_add(new_bytes);
        self.write_total_bytes(total).await?;
        self.touch(&key).await?;

        if total > self.config.max_total_bytes {
            debug!(total, max = self.config.max_total_bytes, "Cache over size bound");
            self.cleanup().await?;
        } else {
            self.sweep_if_due().await?;
        }

        Ok(())
    }

    async fn try_get<T: DeserializeOwned>(
        &self,
        prefix: &str,
        scope: &str,
    ) -> CacheResult<Option<Snapshot<T>>> {
        let key = format!("{prefix}{scope}");

        let envelope = match self.read_envelope(&key).await? {
            Some(envelope) => envelope,
            None => return Ok(None),
        };

        self.touch(&key).await?;

        let data = serde_json::from_str(&envelope.payload)?;
        Ok(Some(Snapshot { data, stored_at: envelope.stored_at }))
    }

    async fn try_clear(&self, scope: &str) -> CacheResult<()> {
        for prefix in [ITEMS_PREFIX, SALES_PREFIX] {
            let key = format!("{prefix}{scope}");
            let released = match self.read_envelope(&key).await? {
                Some(envelope) => envelope.bytes,
                None => continue,
            };
            self.kv.delete(&key).await?;
            let total = self.read_total_bytes().await?.saturating_sub(released);
            self.write_total_bytes(total).await?;
            self.untrack(&key).await?;
        }
        Ok(())
    }

    async fn try_clear_all(&self) -> CacheResult<()> {
        for key in self.kv.keys_with_prefix("").await? {
            self.kv.delete(&key).await?;
        }
        Ok(())
    }

    // =========================================================================
    // Cleanup
    // =========================================================================

    /// Evicts roughly half of all data entries, least recently accessed
    /// first, then recomputes the byte estimate.
    async fn cleanup(&self) -> CacheResult<()> {
        let mut data_keys = self.kv.keys_with_prefix(ITEMS_PREFIX).await?;
        data_keys.extend(self.kv.keys_with_prefix(SALES_PREFIX).await?);

        let lru = self.read_lru().await?;

        // Least recently accessed first; untracked keys evict before
        // anything with a recorded access.
        data_keys.sort_by_key(|key| lru.get(key).copied().unwrap_or(0));

        let evict_count = data_keys.len().div_ceil(2);
        for key in data_keys.iter().take(evict_count) {
            debug!(key = %key, "Evicting cache entry");
            self.kv.delete(key).await?;
            self.untrack(key).await?;
        }

        // Recompute the estimate from what survived.
        let mut total = 0u64;
        for key in data_keys.iter().skip(evict_count) {
            if let Some(envelope) = self.read_envelope(key).await? {
                total = total.saturating_add(envelope.bytes);
            }
        }
        self.write_total_bytes(total).await?;

        self.kv
            .put(LAST_CLEANUP_KEY, &Utc::now().to_rfc3339())
            .await?;

        debug!(evicted = evict_count, remaining_bytes = total, "Cache cleanup complete");
        Ok(())
    }

    /// Runs cleanup when the sweep interval has elapsed since the last one.
    async fn sweep_if_due(&self) -> CacheResult<()> {
        let last = match self.kv.get(LAST_CLEANUP_KEY).await? {
            Some(raw) => DateTime::parse_from_rfc3339(&raw)
                .map(|dt| dt.with_timezone(&Utc))
                .ok(),
            None => None,
        };

        match last {
            Some(last) if Utc::now().signed_duration_since(last) > self.config.sweep_interval() => {
                debug!("Periodic cache sweep due");
                self.cleanup().await
            }
            Some(_) => Ok(()),
            None => {
                // First write: start the sweep clock, nothing to evict yet.
                self.kv
                    .put(LAST_CLEANUP_KEY, &Utc::now().to_rfc3339())
                    .await
            }
        }
    }

    // =========================================================================
    // Bookkeeping
    // =========================================================================

    async fn read_envelope(&self, key: &str) -> CacheResult<Option<Envelope>> {
        match self.kv.get(key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn read_total_bytes(&self) -> CacheResult<u64> {
        Ok(self
            .kv
            .get(TOTAL_BYTES_KEY)
            .await?
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(0))
    }

    async fn write_total_bytes(&self, total: u64) -> CacheResult<()> {
        self.kv.put(TOTAL_BYTES_KEY, &total.to_string()).await
    }

    async fn read_lru(&self) -> CacheResult<HashMap<String, i64>> {
        match self.kv.get(LRU_INDEX_KEY).await? {
            Some(raw) => Ok(serde_json::from_str(&raw).unwrap_or_default()),
            None => Ok(HashMap::new()),
        }
    }

    async fn write_lru(&self, lru: &HashMap<String, i64>) -> CacheResult<()> {
        self.kv.put(LRU_INDEX_KEY, &serde_json::to_string(lru)?).await
    }

    /// Records an access to `key` in the LRU index.
    async fn touch(&self, key: &str) -> CacheResult<()> {
        let mut lru = self.read_lru().await?;
        lru.insert(key.to_string(), Utc::now().timestamp_millis());
        self.write_lru(&lru).await
    }

    /// Drops `key` from the LRU index.
    async fn untrack(&self, key: &str) -> CacheResult<()> {
        let mut lru = self.read_lru().await?;
        if lru.remove(key).is_some() {
            self.write_lru(&lru).await?;
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CacheError;
    use crate::kv::MemoryKv;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use merch_core::{Category, Money, StockBySize};

    fn config() -> CacheConfig {
        CacheConfig { max_total_bytes: 50 * 1024 * 1024, sweep_interval_days: 7 }
    }

    fn item(name: &str) -> Item {
        Item {
            id: format!("id-{name}"),
            group_id: "band".to_string(),
            name: name.to_string(),
            description: String::new(),
            price: Money::from_cents(2000),
            cost: None,
            category: Category::Clothing,
            subcategory: Some("tshirt".to_string()),
            stock: StockBySize::single(3),
            low_stock_threshold: 1,
            sku: None,
            image_refs: Vec::new(),
            // Fixed timestamp so snapshot payloads have a stable byte size.
            updated_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_put_then_get_round_trip() {
        let cache = OfflineCache::new(MemoryKv::shared(), config());

        assert!(cache.get_items("band").await.is_none());

        let items = vec![item("Tee"), item("Hoodie")];
        cache.put_items("band", &items).await;

        let snapshot = cache.get_items("band").await.unwrap();
        assert_eq!(snapshot.data, items);
    }

    #[tokio::test]
    async fn test_scopes_are_independent() {
        let cache = OfflineCache::new(MemoryKv::shared(), config());

        cache.put_items("band-a", &[item("Tee")]).await;
        cache.put_items("band-b", &[item("Hoodie")]).await;

        assert_eq!(cache.get_items("band-a").await.unwrap().data[0].name, "Tee");
        assert_eq!(cache.get_items("band-b").await.unwrap().data[0].name, "Hoodie");

        cache.clear("band-a").await;
        assert!(cache.get_items("band-a").await.is_none());
        assert!(cache.get_items("band-b").await.is_some());
    }

    #[tokio::test]
    async fn test_overflow_evicts_least_recently_used_half() {
        // Tiny bound: one snapshot fits, a second overflows.
        let cache = OfflineCache::new(
            MemoryKv::shared(),
            CacheConfig { max_total_bytes: 400, sweep_interval_days: 7 },
        );

        cache.put_items("stale", &[item("Old")]).await;
        cache.put_items("fresh", &[item("New")]).await;
        // Touch "stale" is NOT refreshed; "fresh" was written last, so the
        // oldest access belongs to "stale".
        cache.put_sales("fresh", &[]).await;

        // The oldest entry must be gone, the newest must survive.
        assert!(cache.get_items("stale").await.is_none());
        assert!(cache.get_items("fresh").await.is_some());
    }

    #[tokio::test]
    async fn test_clear_all_removes_bookkeeping() {
        let cache = OfflineCache::new(MemoryKv::shared(), config());

        cache.put_items("band", &[item("Tee")]).await;
        assert!(cache.approximate_size().await > 0);

        cache.clear_all().await;
        assert!(cache.get_items("band").await.is_none());
        assert_eq!(cache.approximate_size().await, 0);
    }

    #[tokio::test]
    async fn test_size_estimate_tracks_replacement() {
        let cache = OfflineCache::new(MemoryKv::shared(), config());

        cache.put_items("band", &[item("Tee")]).await;
        let first = cache.approximate_size().await;

        // Replacing the snapshot must not double-count.
        cache.put_items("band", &[item("Tee")]).await;
        let second = cache.approximate_size().await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_periodic_sweep_triggers_after_interval() {
        let kv = MemoryKv::shared();
        let cache = OfflineCache::new(
            kv.clone(),
            CacheConfig { max_total_bytes: 50 * 1024 * 1024, sweep_interval_days: 7 },
        );

        cache.put_items("band", &[item("Tee")]).await;
        cache.put_sales("band", &[]).await;

        // Backdate the last-cleanup marker past the interval.
        let long_ago = Utc::now() - chrono::Duration::days(8);
        kv.put(LAST_CLEANUP_KEY, &long_ago.to_rfc3339()).await.unwrap();

        // The next write sweeps: half of the three data entries are evicted.
        cache.put_items("other", &[item("Hoodie")]).await;

        let marker = kv.get(LAST_CLEANUP_KEY).await.unwrap().unwrap();
        let marker: DateTime<Utc> =
            DateTime::parse_from_rfc3339(&marker).unwrap().with_timezone(&Utc);
        assert!(Utc::now().signed_duration_since(marker) < chrono::Duration::minutes(1));

        let mut remaining = 0;
        for scope in ["band", "other"] {
            if cache.get_items(scope).await.is_some() {
                remaining += 1;
            }
        }
        assert!(remaining < 2, "sweep should have evicted at least one snapshot");
    }

    /// Backend that fails every operation, for the swallow-failures policy.
    struct BrokenKv;

    #[async_trait]
    impl KeyValueStore for BrokenKv {
        async fn get(&self, _key: &str) -> CacheResult<Option<String>> {
            Err(CacheError::Storage("disk on fire".to_string()))
        }
        async fn put(&self, _key: &str, _value: &str) -> CacheResult<()> {
            Err(CacheError::Storage("disk on fire".to_string()))
        }
        async fn delete(&self, _key: &str) -> CacheResult<()> {
            Err(CacheError::Storage("disk on fire".to_string()))
        }
        async fn keys_with_prefix(&self, _prefix: &str) -> CacheResult<Vec<String>> {
            Err(CacheError::Storage("disk on fire".to_string()))
        }
    }

    #[tokio::test]
    async fn test_backend_failures_are_swallowed() {
        let cache = OfflineCache::new(Arc::new(BrokenKv), config());

        // None of these may panic or surface an error.
        cache.put_items("band", &[item("Tee")]).await;
        assert!(cache.get_items("band").await.is_none());
        cache.clear("band").await;
        cache.clear_all().await;
        assert_eq!(cache.approximate_size().await, 0);
    }
}
