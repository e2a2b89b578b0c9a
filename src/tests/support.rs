//! Shared fixtures: a call-counting stub upstream, a fixed clock and state builders.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::StatusCode;

use crate::{
    cache,
    clock::{Clock, ManualClock},
    config::{Config, Credentials},
    models::{Address, Invoice, LineItem, Order, Shipment},
    service::OrderLookupService,
    state::AppState,
    upstream::{ClientError, SearchField, UpstreamApi},
};

pub const ACCESS_KEY: &str = "42231012345678000123550010000001231234567890";
pub const USER: &str = "ana";
pub const PASSWORD: &str = "s3cret";

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
}

pub fn manual_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(now()))
}

pub fn test_config() -> Config {
    Config {
        admin_url_template: "https://store.test/admin/order/{entity_id}/".to_string(),
        tracking_url_template: Some("https://track.test/{code}".to_string()),
        credentials: Credentials::new([(USER, PASSWORD), ("bruno", "hunter2")]),
        ..Config::default()
    }
}

/// Order `1000123456` for tax id `12345678901`, created a month before [`now`],
/// with one zero-price line and one priced line.
pub fn sample_order(entity_id: i64, increment_id: &str, created_at: &str) -> Order {
    Order {
        entity_id,
        increment_id: increment_id.to_string(),
        created_at: created_at.to_string(),
        status: "complete".to_string(),
        customer_firstname: Some("Maria".to_string()),
        customer_lastname: Some("Souza".to_string()),
        customer_taxvat: Some("12345678901".to_string()),
        customer_email: Some("maria@example.com".to_string()),
        billing_address: Some(Address {
            street: vec!["Rua das Flores".to_string(), "100".to_string()],
            city: Some("Joinville".to_string()),
            region: Some("SC".to_string()),
            postcode: Some("89200-000".to_string()),
            telephone: Some("47999990000".to_string()),
            ..Address::default()
        }),
        shipping_address: None,
        shipping_description: Some("Correios - PAC".to_string()),
        items: vec![
            LineItem {
                name: "Kit Torneira".to_string(),
                sku: "KIT-1".to_string(),
                qty_ordered: 1.0,
                price: 0.0,
                row_total: 0.0,
            },
            LineItem {
                name: "Torneira Gourmet".to_string(),
                sku: "TG-1".to_string(),
                qty_ordered: 1.0,
                price: 50.0,
                row_total: 50.0,
            },
        ],
        grand_total: 50.0,
        payment_method: Some("pix".to_string()),
    }
}

#[derive(Default)]
pub struct StubUpstream {
    pub orders: Vec<Order>,
    pub invoices: HashMap<i64, Invoice>,
    pub shipments: HashMap<i64, Shipment>,
    /// Make `search_orders` fail with this status (401 maps to `Unauthorized`).
    pub search_failure: Option<StatusCode>,
    /// Make every shipment lookup fail.
    pub shipment_failure: bool,
    pub search_calls: AtomicUsize,
    pub invoice_calls: AtomicUsize,
    pub shipment_calls: AtomicUsize,
    pub get_order_calls: AtomicUsize,
}

impl StubUpstream {
    /// One recent order with a null invoice key and the access key stored in
    /// the shipment's track number.
    pub fn with_sample_order() -> Self {
        let order = sample_order(77, "1000123456", "2026-09-19 12:00:00");
        let mut stub = StubUpstream {
            orders: vec![order],
            ..StubUpstream::default()
        };
        stub.invoices.insert(
            77,
            Invoice {
                entity_id: 9,
                increment_id: "000000009".to_string(),
                order_id: 77,
                created_at: Some("2026-09-20 09:00:00".to_string()),
                access_key: None,
            },
        );
        stub.shipments.insert(
            77,
            Shipment {
                entity_id: 5,
                track_number: Some(ACCESS_KEY.to_string()),
                carrier: Some("Correios".to_string()),
            },
        );
        stub
    }

    pub fn upstream_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
            + self.invoice_calls.load(Ordering::SeqCst)
            + self.shipment_calls.load(Ordering::SeqCst)
            + self.get_order_calls.load(Ordering::SeqCst)
    }

    pub fn searches(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UpstreamApi for StubUpstream {
    async fn search_orders(
        &self,
        field: SearchField,
        value: &str,
    ) -> Result<Vec<Order>, ClientError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        match self.search_failure {
            Some(StatusCode::UNAUTHORIZED) => return Err(ClientError::Unauthorized),
            Some(status) => return Err(ClientError::Status(status)),
            None => {}
        }

        Ok(self
            .orders
            .iter()
            .filter(|order| match field {
                SearchField::TaxId => order.customer_taxvat.as_deref() == Some(value),
                SearchField::OrderNumber => order.increment_id == value,
            })
            .cloned()
            .collect())
    }

    async fn get_order(&self, entity_id: i64) -> Result<Option<Order>, ClientError> {
        self.get_order_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.orders.iter().find(|o| o.entity_id == entity_id).cloned())
    }

    async fn find_invoice_by_order(&self, order_id: i64) -> Result<Option<Invoice>, ClientError> {
        self.invoice_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.invoices.get(&order_id).cloned())
    }

    async fn find_invoice_by_number(
        &self,
        increment_id: &str,
    ) -> Result<Option<Invoice>, ClientError> {
        self.invoice_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .invoices
            .values()
            .find(|i| i.increment_id == increment_id)
            .cloned())
    }

    async fn find_shipment_by_order(
        &self,
        order_id: i64,
    ) -> Result<Option<Shipment>, ClientError> {
        self.shipment_calls.fetch_add(1, Ordering::SeqCst);
        if self.shipment_failure {
            return Err(ClientError::Status(StatusCode::BAD_GATEWAY));
        }
        Ok(self.shipments.get(&order_id).cloned())
    }
}

pub fn lookup_service(stub: Arc<StubUpstream>, clock: Arc<ManualClock>) -> OrderLookupService {
    let config = test_config();
    let clock: Arc<dyn Clock> = clock;
    let cache = cache::init_cache(&config, clock.clone());
    OrderLookupService::new(&config, stub, cache, clock)
}

pub fn app_state(stub: Arc<StubUpstream>, clock: Arc<ManualClock>) -> Arc<AppState> {
    Arc::new(AppState::new(test_config(), lookup_service(stub, clock)))
}
