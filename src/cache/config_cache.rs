//! Per-sector configuration cache
//!
//! Maps a normalized sector key to its resolved `SectorConfig`. Each key owns a
//! `OnceCell`; concurrent callers for the same missing key all await the first
//! caller's computation, so `compute` runs at most once per key.
//!
//! Entries live for the lifetime of the cache. The key space is bounded by the
//! number of sectors, so there is no eviction; use `invalidate`, `refresh` or
//! `clear` to drop stale configurations.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{OnceCell, RwLock};

use crate::config::SectorConfig;
use crate::normalize::{normalize, NormalizedKey};

/// A stored configuration. Never mutated; a refresh swaps in a new entry.
#[derive(Debug)]
pub struct CacheEntry {
    pub key: NormalizedKey,
    pub value: Arc<SectorConfig>,
    pub created_at: DateTime<Utc>,
}

impl CacheEntry {
    fn new(key: NormalizedKey, value: SectorConfig) -> Self {
        Self {
            key,
            value: Arc::new(value),
            created_at: Utc::now(),
        }
    }
}

type Slot = Arc<OnceCell<Arc<CacheEntry>>>;

/// Get-or-compute cache keyed by [`NormalizedKey`]
#[derive(Default)]
pub struct ConfigCache {
    slots: RwLock<HashMap<NormalizedKey, Slot>>,

    // Stats (atomic, no locks)
    hits: AtomicU64,
    misses: AtomicU64,
    stores: AtomicU64,
}

impl ConfigCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached configuration for `raw_key`, computing it on a miss.
    ///
    /// `compute` is not invoked when the key is cached or when another caller
    /// is already computing it. A failed computation leaves the key uncached.
    pub async fn get_or_compute<F, Fut, E>(
        &self,
        raw_key: &str,
        compute: F,
    ) -> Result<Arc<SectorConfig>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<SectorConfig, E>>,
    {
        let key = normalize(raw_key);
        let slot = self.slot(&key).await;

        if let Some(entry) = slot.get() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(key = %key, "config cache hit");
            return Ok(entry.value.clone());
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(key = %key, "config cache miss");

        let result = slot
            .get_or_try_init(|| async {
                let value = compute().await?;
                self.stores.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(key = %key, "config cache store");
                Ok::<_, E>(Arc::new(CacheEntry::new(key.clone(), value)))
            })
            .await;

        match result {
            Ok(entry) => Ok(entry.value.clone()),
            Err(e) => {
                self.discard_empty(&key, &slot).await;
                Err(e)
            }
        }
    }

    /// Compute a fresh value and atomically replace the entry for `raw_key`.
    ///
    /// The old entry stays visible until the new one is stored; on failure
    /// the old entry is kept.
    pub async fn refresh<F, Fut, E>(&self, raw_key: &str, compute: F) -> Result<Arc<SectorConfig>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<SectorConfig, E>>,
    {
        let key = normalize(raw_key);
        let value = compute().await?;
        let entry = Arc::new(CacheEntry::new(key.clone(), value));
        let result = entry.value.clone();

        self.slots
            .write()
            .await
            .insert(key.clone(), Arc::new(OnceCell::new_with(Some(entry))));
        self.stores.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(key = %key, "config cache refreshed");

        Ok(result)
    }

    /// Remove the entry for `raw_key`. Returns true if a value was cached.
    pub async fn invalidate(&self, raw_key: &str) -> bool {
        let key = normalize(raw_key);
        let removed = self.slots.write().await.remove(&key);
        tracing::debug!(key = %key, "config cache invalidate");
        removed.is_some_and(|slot| slot.initialized())
    }

    /// Drop every entry
    pub async fn clear(&self) {
        self.slots.write().await.clear();
        tracing::debug!("config cache cleared");
    }

    /// The stored entry for `raw_key`, if computed
    pub async fn entry(&self, raw_key: &str) -> Option<Arc<CacheEntry>> {
        let key = normalize(raw_key);
        self.slots
            .read()
            .await
            .get(&key)
            .and_then(|slot| slot.get().cloned())
    }

    pub async fn contains(&self, raw_key: &str) -> bool {
        self.entry(raw_key).await.is_some()
    }

    /// Keys with a stored value, sorted
    pub async fn keys(&self) -> Vec<NormalizedKey> {
        let slots = self.slots.read().await;
        let mut keys: Vec<NormalizedKey> = slots
            .iter()
            .filter(|(_, slot)| slot.initialized())
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        keys
    }

    /// Number of stored values
    pub async fn len(&self) -> usize {
        self.slots
            .read()
            .await
            .values()
            .filter(|slot| slot.initialized())
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Get current stats (for monitoring).
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            stores: self.stores.load(Ordering::Relaxed),
        }
    }

    /// Drop the cell for `key` if it is still `slot` and never got a value,
    /// so failed lookups do not accumulate.
    async fn discard_empty(&self, key: &NormalizedKey, slot: &Slot) {
        let mut slots = self.slots.write().await;
        let unused = slots
            .get(key)
            .is_some_and(|current| Arc::ptr_eq(current, slot) && !current.initialized());
        if unused {
            slots.remove(key);
            tracing::debug!(key = %key, "config cache dropped empty slot");
        }
    }

    /// Get or create the cell for `key`
    async fn slot(&self, key: &NormalizedKey) -> Slot {
        if let Some(slot) = self.slots.read().await.get(key) {
            return slot.clone();
        }

        self.slots
            .write()
            .await
            .entry(key.clone())
            .or_default()
            .clone()
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from a stored entry
    pub hits: u64,
    /// Lookups that found no stored entry (includes callers that waited on an
    /// in-flight computation)
    pub misses: u64,
    /// Values written, by computation or refresh
    pub stores: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DefaultConfigTemplate;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    fn counted<'a>(
        calls: &'a AtomicUsize,
        name: &'static str,
    ) -> impl Future<Output = Result<SectorConfig, String>> + 'a {
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok(DefaultConfigTemplate::for_sector(name))
        }
    }

    #[tokio::test]
    async fn test_key_insensitive_hit() {
        let cache = ConfigCache::new();
        let first_calls = AtomicUsize::new(0);
        let second_calls = AtomicUsize::new(0);

        let a = cache
            .get_or_compute("Motores", || counted(&first_calls, "Motores"))
            .await
            .unwrap();
        let b = cache
            .get_or_compute("motores", || counted(&second_calls, "motores"))
            .await
            .unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(first_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second_calls.load(Ordering::SeqCst), 0);
        assert_eq!(cache.stats().hits, 1);
        assert_eq!(cache.stats().stores, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_flight() {
        let cache = ConfigCache::new();
        let calls = AtomicUsize::new(0);

        let (a, b) = tokio::join!(
            cache.get_or_compute("X", || counted(&calls, "X")),
            cache.get_or_compute("X", || counted(&calls, "X")),
        );

        assert!(Arc::ptr_eq(&a.unwrap(), &b.unwrap()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_failure_is_not_cached() {
        let cache = ConfigCache::new();

        let err = cache
            .get_or_compute("Pintura", || async { Err::<SectorConfig, _>("boom") })
            .await
            .unwrap_err();
        assert_eq!(err, "boom");
        assert!(!cache.contains("Pintura").await);

        let ok = cache
            .get_or_compute("Pintura", || async {
                Ok::<_, &str>(DefaultConfigTemplate::for_sector("Pintura"))
            })
            .await
            .unwrap();
        assert_eq!(ok.display_name, "Pintura");
    }

    #[tokio::test]
    async fn test_failed_lookups_leave_no_slots() {
        let cache = ConfigCache::new();

        for i in 0..100 {
            let result = cache
                .get_or_compute(&format!("inexistente{i}"), || async {
                    Err::<SectorConfig, _>("not found")
                })
                .await;
            assert!(result.is_err());
        }

        assert_eq!(cache.slots.read().await.len(), 0);
        assert_eq!(cache.stats().misses, 100);
        assert_eq!(cache.stats().stores, 0);

        // A successful lookup after a failed one still caches
        let _ = cache
            .get_or_compute("Pintura", || async { Err::<SectorConfig, _>("offline") })
            .await;
        cache
            .get_or_compute("Pintura", || async {
                Ok::<_, &str>(DefaultConfigTemplate::for_sector("Pintura"))
            })
            .await
            .unwrap();
        assert_eq!(cache.slots.read().await.len(), 1);
        assert!(cache.contains("pintura").await);
    }

    #[tokio::test]
    async fn test_invalidate_and_clear() {
        let cache = ConfigCache::new();
        for name in ["Motores", "Bobinagem"] {
            cache
                .get_or_compute(name, || async {
                    Ok::<_, String>(DefaultConfigTemplate::for_sector(name))
                })
                .await
                .unwrap();
        }
        assert_eq!(cache.keys().await.len(), 2);

        assert!(cache.invalidate("MOTORES").await);
        assert!(!cache.invalidate("motores").await);
        assert_eq!(cache.len().await, 1);

        cache.clear().await;
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_refresh_replaces_entry() {
        let cache = ConfigCache::new();
        let old = cache
            .get_or_compute("Motores", || async {
                Ok::<_, String>(DefaultConfigTemplate::for_sector("Motores"))
            })
            .await
            .unwrap();

        let new = cache
            .refresh("motores", || async {
                Ok::<_, String>(DefaultConfigTemplate::for_sector("Motores Elétricos"))
            })
            .await
            .unwrap();

        assert!(!Arc::ptr_eq(&old, &new));
        let entry = cache.entry("Motores").await.unwrap();
        assert!(Arc::ptr_eq(&entry.value, &new));
        assert_eq!(entry.key.as_str(), "motores");
        assert_eq!(cache.stats().stores, 2);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_old_entry() {
        let cache = ConfigCache::new();
        let old = cache
            .get_or_compute("Motores", || async {
                Ok::<_, String>(DefaultConfigTemplate::for_sector("Motores"))
            })
            .await
            .unwrap();

        let result = cache
            .refresh("Motores", || async { Err::<SectorConfig, _>("offline".to_string()) })
            .await;
        assert!(result.is_err());

        let entry = cache.entry("motores").await.unwrap();
        assert!(Arc::ptr_eq(&entry.value, &old));
    }
}
