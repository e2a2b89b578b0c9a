pub mod keys;
pub mod query;

pub use keys::CacheKey;
pub use query::{CachedOrders, QueryCache};

use crate::{clock::Clock, config::Config};
use std::sync::Arc;

pub fn init_cache(config: &Config, clock: Arc<dyn Clock>) -> QueryCache {
    QueryCache::new(config.cache_max_capacity, config.cache_ttl, clock)
}
