use crate::config::Config;
use crate::models::{Invoice, Order, Shipment};
use crate::upstream::models::{RawInvoice, RawOrder, RawShipment, SearchResults};
use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::fmt;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Upstream rejected the API token")]
    Unauthorized,

    #[error("Upstream returned status {0}")]
    Status(StatusCode),

    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Could not decode upstream response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    /// Errors worth another attempt: transport failures, throttling and 5xx.
    pub fn is_transient(&self) -> bool {
        match self {
            ClientError::Unauthorized | ClientError::Decode(_) => false,
            ClientError::Status(status) => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            ClientError::Request(e) => e.is_timeout() || e.is_connect() || e.is_request(),
        }
    }
}

/// Order fields the store can be searched by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchField {
    TaxId,
    OrderNumber,
}

impl SearchField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchField::TaxId => "customer_taxvat",
            SearchField::OrderNumber => "increment_id",
        }
    }
}

impl fmt::Display for SearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read access to the store's orders, invoices and shipments.
///
/// "Not found" is `Ok(None)` / `Ok(vec![])`; everything else that went wrong
/// is an `Err`, and callers decide whether to degrade or surface it.
#[async_trait]
pub trait UpstreamApi: Send + Sync {
    async fn search_orders(&self, field: SearchField, value: &str)
        -> Result<Vec<Order>, ClientError>;

    async fn get_order(&self, entity_id: i64) -> Result<Option<Order>, ClientError>;

    async fn find_invoice_by_order(&self, order_id: i64) -> Result<Option<Invoice>, ClientError>;

    async fn find_invoice_by_number(
        &self,
        increment_id: &str,
    ) -> Result<Option<Invoice>, ClientError>;

    async fn find_shipment_by_order(&self, order_id: i64)
        -> Result<Option<Shipment>, ClientError>;
}

/// reqwest-backed client for the store's `rest/V1` API.
pub struct StoreClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
    max_retries: usize,
    limiter: Option<Arc<DefaultDirectRateLimiter>>,
}

impl StoreClient {
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        let timeout = Duration::from_secs(config.upstream_timeout_secs);

        info!(
            "Initializing store client with base URL: {}, timeout: {:?}",
            config.upstream_base_url, timeout
        );

        let http = reqwest::Client::builder().timeout(timeout).build()?;

        let limiter = config
            .upstream_rate_limit
            .and_then(NonZeroU32::new)
            .map(|per_second| Arc::new(RateLimiter::direct(Quota::per_second(per_second))));

        if config.upstream_token.is_empty() {
            warn!("UPSTREAM_TOKEN is not set; every upstream call will be rejected");
        }

        Ok(Self {
            http,
            base_url: config.upstream_base_url.trim_end_matches('/').to_string(),
            token: config.upstream_token.clone(),
            max_retries: config.upstream_max_retries,
            limiter,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// GET a collection filtered by a single `field = value` pair.
    async fn search<T: DeserializeOwned>(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<T>, ClientError> {
        let filter = [
            ("searchCriteria[filter_groups][0][filters][0][field]", field),
            ("searchCriteria[filter_groups][0][filters][0][value]", value),
            ("searchCriteria[filter_groups][0][filters][0][condition_type]", "eq"),
        ];

        match self.get_json::<SearchResults<T>>(&self.url(collection), &filter).await? {
            Some(results) => {
                debug!(
                    "{} search on {}={} returned {} items (total_count: {:?})",
                    collection,
                    field,
                    value,
                    results.items.len(),
                    results.total_count
                );
                Ok(results.items)
            }
            None => Ok(Vec::new()),
        }
    }

    /// Issue an authenticated GET. A 404 is `Ok(None)`.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<Option<T>, ClientError> {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }

        let response = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                let body = response.bytes().await?;
                Ok(Some(serde_json::from_slice(&body)?))
            }
            StatusCode::UNAUTHORIZED => Err(ClientError::Unauthorized),
            StatusCode::NOT_FOUND => Ok(None),
            status => Err(ClientError::Status(status)),
        }
    }
}

#[async_trait]
impl UpstreamApi for StoreClient {
    async fn search_orders(
        &self,
        field: SearchField,
        value: &str,
    ) -> Result<Vec<Order>, ClientError> {
        let raw = (move || async move {
            self.search::<RawOrder>("orders", field.as_str(), value).await
        })
            .retry(
                ExponentialBuilder::default()
                    .with_min_delay(Duration::from_millis(200))
                    .with_max_times(self.max_retries),
            )
            .when(ClientError::is_transient)
            .notify(|err: &ClientError, delay: Duration| {
                warn!("Order search failed ({}), retrying in {:?}", err, delay);
            })
            .await?;

        Ok(raw.into_iter().map(Order::from).collect())
    }

    async fn get_order(&self, entity_id: i64) -> Result<Option<Order>, ClientError> {
        let url = self.url(&format!("orders/{}", entity_id));
        let raw = self.get_json::<RawOrder>(&url, &[]).await?;
        Ok(raw.map(Order::from))
    }

    async fn find_invoice_by_order(&self, order_id: i64) -> Result<Option<Invoice>, ClientError> {
        let items = self
            .search::<RawInvoice>("invoices", "order_id", &order_id.to_string())
            .await?;
        Ok(items.into_iter().next().map(Invoice::from))
    }

    async fn find_invoice_by_number(
        &self,
        increment_id: &str,
    ) -> Result<Option<Invoice>, ClientError> {
        let items = self
            .search::<RawInvoice>("invoices", "increment_id", increment_id)
            .await?;
        Ok(items.into_iter().next().map(Invoice::from))
    }

    async fn find_shipment_by_order(
        &self,
        order_id: i64,
    ) -> Result<Option<Shipment>, ClientError> {
        let items = self
            .search::<RawShipment>("shipments", "order_id", &order_id.to_string())
            .await?;
        Ok(items.into_iter().next().map(Shipment::from))
    }
}
