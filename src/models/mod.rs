// Domain shapes read from the store API, and the enriched records we serve.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;

use crate::fiscal::FiscalKeyInfo;

/// Timestamp format used by the store API (`2024-03-01 14:22:05`, UTC).
pub const UPSTREAM_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Address {
    pub street: Vec<String>,
    pub number: Option<String>,
    pub complement: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub postcode: Option<String>,
    pub telephone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineItem {
    pub name: String,
    pub sku: String,
    pub qty_ordered: f64,
    pub price: f64,
    pub row_total: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Order {
    pub entity_id: i64,
    pub increment_id: String,
    pub created_at: String,
    pub status: String,
    pub customer_firstname: Option<String>,
    pub customer_lastname: Option<String>,
    pub customer_taxvat: Option<String>,
    pub customer_email: Option<String>,
    pub billing_address: Option<Address>,
    pub shipping_address: Option<Address>,
    pub shipping_description: Option<String>,
    pub items: Vec<LineItem>,
    pub grand_total: f64,
    pub payment_method: Option<String>,
}

impl Order {
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        NaiveDateTime::parse_from_str(&self.created_at, UPSTREAM_DATETIME_FORMAT)
            .ok()
            .map(|naive| naive.and_utc())
    }

    pub fn customer_name(&self) -> String {
        [&self.customer_firstname, &self.customer_lastname]
            .into_iter()
            .flatten()
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Invoice {
    pub entity_id: i64,
    pub increment_id: String,
    pub order_id: i64,
    pub created_at: Option<String>,
    pub access_key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Shipment {
    pub entity_id: i64,
    pub track_number: Option<String>,
    pub carrier: Option<String>,
}

// Response models

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Produto {
    pub name: String,
    pub sku: String,
    pub qty: f64,
    pub price: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Endereco {
    pub rua: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numero: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complemento: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bairro: Option<String>,
    pub cidade: String,
    pub estado: String,
    pub cep: String,
    pub telefone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotaFiscal {
    pub fatura: Option<String>,
    pub data: Option<String>,
    pub chave: Option<String>,
    pub info: Option<FiscalKeyInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rastreio {
    pub codigo: Option<String>,
    pub transportadora: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedOrder {
    pub increment_id: String,
    pub entity_id: i64,
    pub created_at: String,
    pub status: String,
    pub cliente: String,
    pub cpf: String,
    pub email: Option<String>,
    pub endereco: Option<Endereco>,
    pub produtos: Vec<Produto>,
    pub total: f64,
    pub pagamento: Option<String>,
    pub nota_fiscal: Option<NotaFiscal>,
    pub rastreio: Option<Rastreio>,
    pub admin_url: String,
}
