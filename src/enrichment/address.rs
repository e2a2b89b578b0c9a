//! Address and tax id normalization for the response payload.

use crate::models::{Address, Endereco, Order};

/// Delivery address for an order.
///
/// The shipping assignment wins and always carries the full field set, with
/// empty strings for anything missing. Billing is only a fallback and yields
/// the reduced set (no number/complement/neighborhood).
pub fn delivery_address(order: &Order) -> Option<Endereco> {
    if let Some(shipping) = &order.shipping_address {
        return Some(Endereco {
            rua: shipping.street.join(", "),
            numero: Some(text(&shipping.number)),
            complemento: Some(text(&shipping.complement)),
            bairro: Some(text(&shipping.neighborhood)),
            cidade: text(&shipping.city),
            estado: text(&shipping.region),
            cep: text(&shipping.postcode),
            telefone: text(&shipping.telephone),
        });
    }

    order.billing_address.as_ref().map(reduced)
}

fn reduced(billing: &Address) -> Endereco {
    Endereco {
        rua: billing.street.join(", "),
        numero: None,
        complemento: None,
        bairro: None,
        cidade: text(&billing.city),
        estado: text(&billing.region),
        cep: text(&billing.postcode),
        telefone: text(&billing.telephone),
    }
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

/// Keep only the digits of a value.
pub fn digits_only(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

/// Format an 11-digit CPF as `NNN.NNN.NNN-NN`.
///
/// Absent values become `""`; other lengths (e.g. a CNPJ) come back as plain
/// digits.
pub fn format_tax_id(tax_id: Option<&str>) -> String {
    let Some(raw) = tax_id else {
        return String::new();
    };
    let digits = digits_only(raw);
    if digits.len() != 11 {
        return digits;
    }
    format!(
        "{}.{}.{}-{}",
        &digits[0..3],
        &digits[3..6],
        &digits[6..9],
        &digits[9..11]
    )
}
