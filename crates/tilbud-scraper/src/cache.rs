//! Short-TTL memoization of per-term fetch results.
//!
//! Read-through only: callers consult the cache before the orchestrator
//! and insert after. Entries expire after a fixed TTL and the map is
//! bounded: when full, the oldest-inserted entry is evicted so cache
//! size cannot grow without limit under high query cardinality.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tilbud_core::Offer;
use tokio::sync::Mutex;

/// Cache key: the full set of request parameters that shape a result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub term: String,
    pub limit: usize,
    pub delay_ms: u64,
}

#[derive(Debug)]
struct CacheEntry {
    inserted_at: Instant,
    offers: Vec<Offer>,
}

/// Process-wide TTL cache for search results.
#[derive(Debug)]
pub struct SearchCache {
    ttl: Duration,
    max_entries: usize,
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
}

impl SearchCache {
    #[must_use]
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            ttl,
            max_entries: max_entries.max(1),
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Fresh cached offers for this key, if any. Expired entries are
    /// dropped on read.
    pub async fn get(&self, key: &CacheKey) -> Option<Vec<Offer>> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => Some(entry.offers.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Store (or overwrite) the offers for a key, evicting the
    /// oldest-inserted entry when the cache is full.
    pub async fn insert(&self, key: CacheKey, offers: Vec<Offer>) {
        let mut entries = self.entries.lock().await;

        if !entries.contains_key(&key) && entries.len() >= self.max_entries {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.inserted_at)
                .map(|(k, _)| k.clone());
            if let Some(oldest_key) = oldest {
                entries.remove(&oldest_key);
            }
        }

        entries.insert(
            key,
            CacheEntry {
                inserted_at: Instant::now(),
                offers,
            },
        );
    }

    /// Current entry count, expired entries included until read.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilbud_core::OfferKind;

    fn key(term: &str) -> CacheKey {
        CacheKey {
            term: term.to_string(),
            limit: 40,
            delay_ms: 120,
        }
    }

    fn offer(name: &str) -> Offer {
        Offer {
            source_url: format!("https://etilbudsavis.dk/t?publication=p&offer={name}"),
            store: Some("Netto".to_string()),
            publication: None,
            offer_id: None,
            public_id: None,
            name: Some(name.to_string()),
            price: Some(10.0),
            currency: "DKK".to_string(),
            unit_price: None,
            unit_price_unit: None,
            valid_from: None,
            valid_through: None,
            image: None,
            kind: OfferKind::Offer,
            discount_percent: None,
        }
    }

    #[tokio::test]
    async fn hit_within_ttl_returns_stored_offers() {
        let cache = SearchCache::new(Duration::from_secs(300), 16);
        cache.insert(key("mælk"), vec![offer("Letmælk")]).await;

        let hit = cache.get(&key("mælk")).await.expect("cache hit");
        assert_eq!(hit.len(), 1);
        assert_eq!(hit[0].name.as_deref(), Some("Letmælk"));
    }

    #[tokio::test]
    async fn miss_for_unknown_or_different_key() {
        let cache = SearchCache::new(Duration::from_secs(300), 16);
        cache.insert(key("mælk"), vec![offer("Letmælk")]).await;

        assert!(cache.get(&key("løg")).await.is_none());
        let different_limit = CacheKey {
            limit: 10,
            ..key("mælk")
        };
        assert!(cache.get(&different_limit).await.is_none());
    }

    #[tokio::test]
    async fn expired_entry_is_dropped_on_read() {
        let cache = SearchCache::new(Duration::from_millis(20), 16);
        cache.insert(key("mælk"), vec![offer("Letmælk")]).await;

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(cache.get(&key("mælk")).await.is_none());
        assert!(cache.is_empty().await, "expired entry removed on read");
    }

    #[tokio::test]
    async fn insert_overwrites_existing_key() {
        let cache = SearchCache::new(Duration::from_secs(300), 16);
        cache.insert(key("mælk"), vec![offer("Letmælk")]).await;
        cache.insert(key("mælk"), vec![offer("Skummetmælk")]).await;

        let hit = cache.get(&key("mælk")).await.expect("cache hit");
        assert_eq!(hit.len(), 1);
        assert_eq!(hit[0].name.as_deref(), Some("Skummetmælk"));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn full_cache_evicts_oldest_inserted_entry() {
        let cache = SearchCache::new(Duration::from_secs(300), 2);
        cache.insert(key("a"), vec![]).await;
        cache.insert(key("b"), vec![]).await;
        cache.insert(key("c"), vec![]).await;

        assert_eq!(cache.len().await, 2);
        assert!(cache.get(&key("a")).await.is_none(), "oldest evicted");
        assert!(cache.get(&key("b")).await.is_some());
        assert!(cache.get(&key("c")).await.is_some());
    }
}
