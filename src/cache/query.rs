//! Order search result cache implementation using Moka

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use moka::future::Cache;
use tracing::{debug, info};

use super::keys::CacheKey;
use crate::clock::Clock;
use crate::models::EnrichedOrder;

pub type CachedOrders = Arc<Vec<EnrichedOrder>>;

#[derive(Clone)]
struct CacheEntry {
    orders: CachedOrders,
    stored_at: DateTime<Utc>,
}

/// Caches enriched search results for a fixed TTL.
///
/// Expiry is decided against the injected [`Clock`]; moka's own TTL and
/// capacity bound only keep memory in check.
#[derive(Clone)]
pub struct QueryCache {
    cache: Cache<CacheKey, CacheEntry>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl QueryCache {
    pub fn new(capacity: u64, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        let cache = Cache::builder()
            .max_capacity(capacity)
            .time_to_live(ttl)
            .build();

        Self { cache, ttl, clock }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Get cached results if they are younger than the TTL.
    pub async fn get(&self, key: &CacheKey) -> Option<CachedOrders> {
        let Some(entry) = self.cache.get(key).await else {
            debug!("Cache miss for key: {}", key);
            return None;
        };

        // A negative age (clock stepped back) counts as fresh.
        let fresh = (self.clock.now() - entry.stored_at)
            .to_std()
            .map_or(true, |age| age < self.ttl);

        if fresh {
            debug!("Cache hit for key: {}", key);
            Some(entry.orders)
        } else {
            debug!("Cache entry expired for key: {}", key);
            self.cache.invalidate(key).await;
            None
        }
    }

    /// Store results, replacing any previous entry for the key.
    pub async fn set(&self, key: CacheKey, orders: CachedOrders) {
        debug!("Caching {} orders for key: {}", orders.len(), key);
        let entry = CacheEntry {
            orders,
            stored_at: self.clock.now(),
        };
        self.cache.insert(key, entry).await;
    }

    /// Drop every entry and report the resulting size.
    pub async fn clear(&self) -> u64 {
        let keys: Vec<Arc<CacheKey>> = self.cache.iter().map(|(key, _)| key).collect();
        for key in keys {
            self.cache.invalidate(key.as_ref()).await;
        }
        self.cache.run_pending_tasks().await;
        let size = self.len();
        info!("Query cache cleared, {} entries remain", size);
        size
    }

    /// Number of live entries. Walks the cache, so it skips entries that
    /// were invalidated but not yet evicted.
    pub fn len(&self) -> u64 {
        self.cache.iter().count() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
