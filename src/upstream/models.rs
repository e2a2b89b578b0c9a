//! Raw store API payloads and their mapping into domain models.
//!
//! Field names follow the store's REST contract exactly. Numeric fields are
//! accepted either as JSON numbers or as numeric strings, since both show up
//! depending on the store extension that produced the record.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::models::{Address, Invoice, LineItem, Order, Shipment};

#[derive(Debug, Deserialize)]
pub struct SearchResults<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub total_count: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct RawOrder {
    #[serde(deserialize_with = "lenient_i64")]
    pub entity_id: i64,
    #[serde(default)]
    pub increment_id: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub status: String,
    pub customer_firstname: Option<String>,
    pub customer_lastname: Option<String>,
    pub customer_taxvat: Option<String>,
    pub customer_email: Option<String>,
    pub billing_address: Option<RawAddress>,
    pub shipping_description: Option<String>,
    #[serde(default)]
    pub items: Vec<RawLineItem>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub grand_total: f64,
    pub payment: Option<RawPayment>,
    pub extension_attributes: Option<RawOrderExtension>,
}

#[derive(Debug, Deserialize)]
pub struct RawOrderExtension {
    #[serde(default)]
    pub shipping_assignments: Vec<RawShippingAssignment>,
}

#[derive(Debug, Deserialize)]
pub struct RawShippingAssignment {
    pub shipping: Option<RawShipping>,
}

#[derive(Debug, Deserialize)]
pub struct RawShipping {
    pub address: Option<RawAddress>,
}

#[derive(Debug, Deserialize)]
pub struct RawPayment {
    pub method: Option<String>,
}

/// Street comes as a list of lines, but some integrations send one string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawStreet {
    Lines(Vec<String>),
    Single(String),
}

#[derive(Debug, Deserialize)]
pub struct RawAddress {
    pub street: Option<RawStreet>,
    pub number: Option<String>,
    pub complement: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub postcode: Option<String>,
    pub telephone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawLineItem {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sku: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub qty_ordered: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub row_total: f64,
}

#[derive(Debug, Deserialize)]
pub struct RawInvoice {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub entity_id: i64,
    #[serde(default)]
    pub increment_id: String,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub order_id: i64,
    pub created_at: Option<String>,
    pub extension_attributes: Option<RawInvoiceExtension>,
}

#[derive(Debug, Deserialize)]
pub struct RawInvoiceExtension {
    pub nfe_key: Option<String>,
    pub chave_acesso: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawShipment {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub entity_id: i64,
    #[serde(default)]
    pub tracks: Vec<RawTrack>,
}

#[derive(Debug, Deserialize)]
pub struct RawTrack {
    pub track_number: Option<String>,
    pub title: Option<String>,
    pub carrier_code: Option<String>,
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    })
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let id = match &value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    id.ok_or_else(|| serde::de::Error::custom(format!("expected integer id, got {}", value)))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl From<RawAddress> for Address {
    fn from(raw: RawAddress) -> Self {
        let street = match raw.street {
            Some(RawStreet::Lines(lines)) => lines,
            Some(RawStreet::Single(line)) => vec![line],
            None => Vec::new(),
        }
        .into_iter()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect();

        Address {
            street,
            number: non_blank(raw.number),
            complement: non_blank(raw.complement),
            neighborhood: non_blank(raw.neighborhood),
            city: non_blank(raw.city),
            region: non_blank(raw.region),
            postcode: non_blank(raw.postcode),
            telephone: non_blank(raw.telephone),
        }
    }
}

impl From<RawLineItem> for LineItem {
    fn from(raw: RawLineItem) -> Self {
        LineItem {
            name: raw.name,
            sku: raw.sku,
            qty_ordered: raw.qty_ordered,
            price: raw.price,
            row_total: raw.row_total,
        }
    }
}

impl From<RawOrder> for Order {
    fn from(raw: RawOrder) -> Self {
        let shipping_address = raw
            .extension_attributes
            .and_then(|ext| ext.shipping_assignments.into_iter().next())
            .and_then(|assignment| assignment.shipping)
            .and_then(|shipping| shipping.address)
            .map(Address::from);

        Order {
            entity_id: raw.entity_id,
            increment_id: raw.increment_id,
            created_at: raw.created_at,
            status: raw.status,
            customer_firstname: non_blank(raw.customer_firstname),
            customer_lastname: non_blank(raw.customer_lastname),
            customer_taxvat: non_blank(raw.customer_taxvat),
            customer_email: non_blank(raw.customer_email),
            billing_address: raw.billing_address.map(Address::from),
            shipping_address,
            shipping_description: non_blank(raw.shipping_description),
            items: raw.items.into_iter().map(LineItem::from).collect(),
            grand_total: raw.grand_total,
            payment_method: raw.payment.and_then(|p| non_blank(p.method)),
        }
    }
}

impl From<RawInvoice> for Invoice {
    fn from(raw: RawInvoice) -> Self {
        let access_key = raw.extension_attributes.and_then(|ext| {
            non_blank(ext.nfe_key).or_else(|| non_blank(ext.chave_acesso))
        });

        Invoice {
            entity_id: raw.entity_id,
            increment_id: raw.increment_id,
            order_id: raw.order_id,
            created_at: non_blank(raw.created_at),
            access_key,
        }
    }
}

impl From<RawShipment> for Shipment {
    fn from(raw: RawShipment) -> Self {
        let track = raw.tracks.into_iter().next();
        let (track_number, carrier) = match track {
            Some(track) => (
                non_blank(track.track_number),
                non_blank(track.title).or_else(|| non_blank(track.carrier_code)),
            ),
            None => (None, None),
        };

        Shipment {
            entity_id: raw.entity_id,
            track_number,
            carrier,
        }
    }
}
