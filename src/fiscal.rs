//! Decoding of the 44-digit electronic invoice access key (chave de acesso).
//!
//! Layout: `UF(2) AAMM(4) CNPJ(14) MOD(2) SERIE(3) NUMERO(9) TPEMIS+CODIGO+DV(10)`.

use serde::Serialize;

pub const ACCESS_KEY_LEN: usize = 44;

/// Structured fields derived from an access key. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FiscalKeyInfo {
    #[serde(rename = "serie")]
    pub series: String,
    #[serde(rename = "numero_raw")]
    pub sequence_raw: String,
    #[serde(rename = "numero")]
    pub sequence: String,
    #[serde(rename = "numero_formatado")]
    pub sequence_formatted: String,
    #[serde(rename = "formatado")]
    pub format: String,
    #[serde(rename = "uf_codigo")]
    pub uf_code: String,
    pub uf: String,
    #[serde(rename = "ano")]
    pub year: String,
    #[serde(rename = "mes")]
    pub month: String,
    pub cnpj: String,
    #[serde(rename = "modelo_codigo")]
    pub model_code: String,
    #[serde(rename = "modelo")]
    pub model: String,
}

/// Parse an access key. Returns `None` for anything that is not a
/// well-formed 44 character key.
pub fn parse_access_key(key: &str) -> Option<FiscalKeyInfo> {
    if key.len() != ACCESS_KEY_LEN || !key.is_ascii() {
        return None;
    }

    let uf_code = key.get(0..2)?;
    let year = key.get(2..4)?;
    let month = key.get(4..6)?;
    let cnpj = key.get(6..20)?;
    let model_code = key.get(20..22)?;
    let series = key.get(22..25)?;
    let sequence_raw = key.get(25..34)?;

    let sequence = sequence_raw.parse::<u64>().ok()?.to_string();

    Some(FiscalKeyInfo {
        series: series.to_string(),
        sequence_raw: sequence_raw.to_string(),
        format: format!("{}/{}", series, sequence),
        sequence,
        sequence_formatted: group_digits(sequence_raw),
        uf_code: uf_code.to_string(),
        uf: uf_label(uf_code),
        year: format!("20{}", year),
        month: month.to_string(),
        cnpj: format_cnpj(cnpj)?,
        model_code: model_code.to_string(),
        model: model_label(model_code),
    })
}

/// Returns true when the value looks like an access key rather than a
/// carrier tracking code.
pub fn is_access_key(value: &str) -> bool {
    value.len() == ACCESS_KEY_LEN
}

fn group_digits(raw: &str) -> String {
    raw.as_bytes()
        .chunks(3)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect::<Vec<_>>()
        .join(".")
}

fn format_cnpj(cnpj: &str) -> Option<String> {
    Some(format!(
        "{}.{}.{}/{}-{}",
        cnpj.get(0..2)?,
        cnpj.get(2..5)?,
        cnpj.get(5..8)?,
        cnpj.get(8..12)?,
        cnpj.get(12..14)?,
    ))
}

fn uf_label(code: &str) -> String {
    let uf = match code {
        "42" => "SC",
        "35" => "SP",
        "33" => "RJ",
        "41" => "PR",
        "43" => "RS",
        "31" => "MG",
        _ => return format!("UF {}", code),
    };
    uf.to_string()
}

fn model_label(code: &str) -> String {
    match code {
        "55" => "NF-e".to_string(),
        "65" => "NFC-e".to_string(),
        _ => format!("Modelo {}", code),
    }
}
