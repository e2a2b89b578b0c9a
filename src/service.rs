//! Order lookup: cache, upstream search, lookback filter and enrichment.

use std::sync::Arc;

use chrono::Months;
use tracing::{debug, info};

use crate::cache::{CacheKey, CachedOrders, QueryCache};
use crate::clock::Clock;
use crate::config::Config;
use crate::enrichment::Enricher;
use crate::models::Order;
use crate::upstream::{ClientError, SearchField, UpstreamApi};
use crate::validation::SearchQuery;

/// Result of a lookup, with whether it was served from cache.
#[derive(Debug, Clone)]
pub struct LookupOutcome {
    pub orders: CachedOrders,
    pub cache_hit: bool,
}

#[derive(Clone)]
pub struct OrderLookupService {
    upstream: Arc<dyn UpstreamApi>,
    enricher: Enricher,
    cache: QueryCache,
    clock: Arc<dyn Clock>,
    lookback_months: u32,
}

impl OrderLookupService {
    pub fn new(
        config: &Config,
        upstream: Arc<dyn UpstreamApi>,
        cache: QueryCache,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            enricher: Enricher::new(upstream.clone(), config),
            upstream,
            cache,
            clock,
            lookback_months: config.order_lookback_months,
        }
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Run a validated search on behalf of `user`.
    pub async fn lookup(
        &self,
        query: &SearchQuery,
        user: &str,
    ) -> Result<LookupOutcome, ClientError> {
        match query {
            SearchQuery::Orders { field, value } => self.search_orders(*field, value, user).await,
            SearchQuery::InvoiceNumber(number) => {
                let orders = self.lookup_by_invoice(number).await?;
                Ok(LookupOutcome {
                    orders,
                    cache_hit: false,
                })
            }
        }
    }

    async fn search_orders(
        &self,
        field: SearchField,
        value: &str,
        user: &str,
    ) -> Result<LookupOutcome, ClientError> {
        let cache_key = CacheKey::order_search(field, value, user);

        if let Some(orders) = self.cache.get(&cache_key).await {
            info!("Cache hit for key: {}", cache_key);
            return Ok(LookupOutcome {
                orders,
                cache_hit: true,
            });
        }
        info!("Cache miss for key: {}", cache_key);

        let found = self.upstream.search_orders(field, value).await?;
        let total = found.len();
        let recent = self.within_lookback(found);
        debug!(
            "{} of {} orders for {}={} are inside the lookback window",
            recent.len(),
            total,
            field,
            value
        );

        let orders: CachedOrders = Arc::new(self.enricher.enrich_orders(recent).await);
        self.cache.set(cache_key, orders.clone()).await;

        Ok(LookupOutcome {
            orders,
            cache_hit: false,
        })
    }

    /// Look up the invoice by its number, then the order it belongs to.
    async fn lookup_by_invoice(&self, number: &str) -> Result<CachedOrders, ClientError> {
        let Some(invoice) = self.upstream.find_invoice_by_number(number).await? else {
            info!("No invoice found for number {}", number);
            return Ok(Arc::new(Vec::new()));
        };

        let Some(order) = self.upstream.get_order(invoice.order_id).await? else {
            info!(
                "Invoice {} points to order {}, which was not found",
                number, invoice.order_id
            );
            return Ok(Arc::new(Vec::new()));
        };

        Ok(Arc::new(vec![self.enricher.enrich_order(order).await]))
    }

    /// Keep orders created within the lookback window. Orders whose creation
    /// date cannot be read are dropped.
    fn within_lookback(&self, orders: Vec<Order>) -> Vec<Order> {
        let now = self.clock.now();
        let Some(cutoff) = now.checked_sub_months(Months::new(self.lookback_months)) else {
            return orders;
        };

        orders
            .into_iter()
            .filter(|order| match order.created_at_utc() {
                Some(created) => created >= cutoff,
                None => {
                    debug!(
                        "Dropping order {} with unreadable created_at {:?}",
                        order.increment_id, order.created_at
                    );
                    false
                }
            })
            .collect()
    }
}
