use crate::cache::QueryCache;
use crate::config::Config;
use crate::service::OrderLookupService;

pub struct AppState {
    pub config: Config,
    pub cache: QueryCache,
    pub lookup: OrderLookupService,
}

impl AppState {
    pub fn new(config: Config, lookup: OrderLookupService) -> Self {
        Self {
            cache: lookup.cache().clone(),
            config,
            lookup,
        }
    }
}
