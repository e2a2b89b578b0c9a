use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::config::Config;
use crate::enrichment::address::{delivery_address, format_tax_id};
use crate::fiscal::{is_access_key, parse_access_key};
use crate::models::{
    EnrichedOrder, Invoice, LineItem, NotaFiscal, Order, Produto, Rastreio, Shipment,
};
use crate::upstream::UpstreamApi;

/// Merges an order with its invoice and shipment into an [`EnrichedOrder`].
#[derive(Clone)]
pub struct Enricher {
    upstream: Arc<dyn UpstreamApi>,
    admin_url_template: String,
    tracking_url_template: Option<String>,
}

impl Enricher {
    pub fn new(upstream: Arc<dyn UpstreamApi>, config: &Config) -> Self {
        Self {
            upstream,
            admin_url_template: config.admin_url_template.clone(),
            tracking_url_template: config.tracking_url_template.clone(),
        }
    }

    /// Enrich every order concurrently. Output order matches input order.
    pub async fn enrich_orders(&self, orders: Vec<Order>) -> Vec<EnrichedOrder> {
        join_all(orders.into_iter().map(|order| self.enrich_order(order))).await
    }

    /// Enrich one order. Upstream failures degrade the affected fields to
    /// `None`; this never fails.
    pub async fn enrich_order(&self, order: Order) -> EnrichedOrder {
        let (invoice, shipment) = tokio::join!(
            self.upstream.find_invoice_by_order(order.entity_id),
            self.upstream.find_shipment_by_order(order.entity_id),
        );

        let invoice = invoice.unwrap_or_else(|e| {
            warn!("Invoice lookup failed for order {}: {}", order.increment_id, e);
            None
        });
        let shipment = shipment.unwrap_or_else(|e| {
            warn!("Shipment lookup failed for order {}: {}", order.increment_id, e);
            None
        });

        self.merge(order, invoice, shipment)
    }

    fn merge(
        &self,
        order: Order,
        invoice: Option<Invoice>,
        shipment: Option<Shipment>,
    ) -> EnrichedOrder {
        let nota_fiscal = nota_fiscal(invoice.as_ref(), shipment.as_ref());
        let rastreio = self.rastreio(shipment.as_ref(), order.shipping_description.as_deref());

        EnrichedOrder {
            cliente: order.customer_name(),
            cpf: format_tax_id(order.customer_taxvat.as_deref()),
            endereco: delivery_address(&order),
            produtos: products(&order.items),
            admin_url: self
                .admin_url_template
                .replace("{entity_id}", &order.entity_id.to_string()),
            increment_id: order.increment_id,
            entity_id: order.entity_id,
            created_at: order.created_at,
            status: order.status,
            email: order.customer_email,
            total: order.grand_total,
            pagamento: order.payment_method,
            nota_fiscal,
            rastreio,
        }
    }

    fn rastreio(
        &self,
        shipment: Option<&Shipment>,
        shipping_description: Option<&str>,
    ) -> Option<Rastreio> {
        // A track number that is really an access key is not a tracking code.
        let codigo = shipment
            .and_then(|s| s.track_number.as_deref())
            .filter(|number| !is_access_key(number))
            .map(str::to_string);
        let transportadora = shipment
            .and_then(|s| s.carrier.clone())
            .or_else(|| shipping_description.map(str::to_string));

        if codigo.is_none() && transportadora.is_none() {
            return None;
        }

        let url = match (&codigo, &self.tracking_url_template) {
            (Some(code), Some(template)) => Some(template.replace("{code}", code)),
            _ => None,
        };

        Some(Rastreio {
            codigo,
            transportadora,
            url,
        })
    }
}

/// Access key resolution order: the shipment track number when it holds a
/// 44-character value (some orders have the key stored there instead of a
/// carrier code), then the invoice's own attribute.
pub fn resolve_access_key(
    invoice: Option<&Invoice>,
    shipment: Option<&Shipment>,
) -> Option<String> {
    shipment
        .and_then(|s| s.track_number.as_deref())
        .filter(|number| is_access_key(number))
        .or_else(|| invoice.and_then(|i| i.access_key.as_deref()))
        .map(str::to_string)
}

fn nota_fiscal(invoice: Option<&Invoice>, shipment: Option<&Shipment>) -> Option<NotaFiscal> {
    let chave = resolve_access_key(invoice, shipment);
    if invoice.is_none() && chave.is_none() {
        return None;
    }

    let info = chave.as_deref().and_then(parse_access_key);
    if chave.is_some() && info.is_none() {
        debug!("Access key {:?} could not be decoded", chave);
    }

    Some(NotaFiscal {
        fatura: invoice.map(|i| i.increment_id.clone()),
        data: invoice.and_then(|i| i.created_at.clone()),
        chave,
        info,
    })
}

/// Zero-price lines are duplicates some orders carry (e.g. configurable
/// product children) and are dropped.
fn products(items: &[LineItem]) -> Vec<Produto> {
    items
        .iter()
        .filter(|item| item.price > 0.0)
        .map(|item| Produto {
            name: item.name.clone(),
            sku: item.sku.clone(),
            qty: item.qty_ordered,
            price: item.price,
            total: item.row_total,
        })
        .collect()
}
