use serde::Deserialize;
use thiserror::Error;

use crate::enrichment::address::digits_only;
use crate::upstream::SearchField;

/// Longer digit strings are tax ids, shorter ones are order numbers.
pub const ORDER_NUMBER_MAX_DIGITS: usize = 9;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Provide one search parameter: cpf, pedido or nf")]
    MissingParameter,

    #[error("Provide exactly one search parameter, got: {0}")]
    ConflictingParameters(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Query string of `GET /api/pedidos`.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub cpf: Option<String>,
    pub pedido: Option<String>,
    pub nf: Option<String>,
    /// Legacy single box: tax id or order number, told apart by length.
    pub valor: Option<String>,
}

/// A validated search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchQuery {
    Orders { field: SearchField, value: String },
    InvoiceNumber(String),
}

pub fn validate_search(params: &SearchParams) -> Result<SearchQuery, ValidationError> {
    let supplied: Vec<(&str, &str)> = [
        ("cpf", &params.cpf),
        ("pedido", &params.pedido),
        ("nf", &params.nf),
        ("valor", &params.valor),
    ]
    .into_iter()
    .filter_map(|(name, value)| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| (name, v))
    })
    .collect();

    let (name, value) = match supplied.as_slice() {
        [] => return Err(ValidationError::MissingParameter),
        [single] => *single,
        many => {
            let names: Vec<&str> = many.iter().map(|(name, _)| *name).collect();
            return Err(ValidationError::ConflictingParameters(names.join(", ")));
        }
    };

    match name {
        "cpf" => {
            let digits = digits_only(value);
            if digits.is_empty() {
                return Err(ValidationError::InvalidParameter(
                    "cpf must contain digits".to_string(),
                ));
            }
            Ok(SearchQuery::Orders {
                field: SearchField::TaxId,
                value: digits,
            })
        }
        "pedido" => Ok(SearchQuery::Orders {
            field: SearchField::OrderNumber,
            value: value.to_string(),
        }),
        "nf" => Ok(SearchQuery::InvoiceNumber(value.to_string())),
        _ => {
            let digits = digits_only(value);
            if digits.is_empty() {
                return Err(ValidationError::InvalidParameter(
                    "valor must contain digits".to_string(),
                ));
            }
            let field = if digits.len() > ORDER_NUMBER_MAX_DIGITS {
                SearchField::TaxId
            } else {
                SearchField::OrderNumber
            };
            Ok(SearchQuery::Orders {
                field,
                value: digits,
            })
        }
    }
}
