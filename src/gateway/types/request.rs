//! Request DTOs
//!
//! Field names keep the wire format (`numeroCartao`, `senhaCartao`, `valor`).
//! Conversion into core types happens here, so handlers never touch raw
//! strings.

use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::authorization::{Rejection, TransactionRequest};
use crate::card::CardNumber;
use crate::money::Money;

pub use crate::card::CreateCardPayload;

/// Transaction submission
///
/// Every field is optional at this layer: missing or malformed values are
/// reported through the authorization chain so the error code precedence
/// holds.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct TransactionPayload {
    #[serde(rename = "numeroCartao", default)]
    #[schema(example = "1234567890123456")]
    pub numero_cartao: Option<String>,

    #[serde(rename = "senhaCartao", default)]
    #[schema(example = "1234")]
    pub senha_cartao: Option<String>,

    /// Number or decimal string
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "10.00")]
    pub valor: Option<serde_json::Value>,
}

impl TransactionPayload {
    /// Build the core request
    ///
    /// A missing or malformed card number cannot name a card, so it is
    /// answered with `CARD_NOT_FOUND` directly.
    pub fn into_request(self) -> Result<TransactionRequest, Rejection> {
        let card_number = self
            .numero_cartao
            .as_deref()
            .and_then(|raw| CardNumber::parse(raw).ok())
            .ok_or(Rejection::CardNotFound)?;

        let amount = self.valor.as_ref().and_then(parse_amount);

        Ok(TransactionRequest::new(card_number, self.senha_cartao, amount))
    }
}

/// Accept `10`, `10.5`, `1e16` and `"10.50"`; anything else counts as absent
///
/// Strings must be plain decimals. JSON numbers may render in exponent form
/// (large floats print as `1e16`), so those go through the scientific parser.
fn parse_amount(value: &serde_json::Value) -> Option<Money> {
    match value {
        serde_json::Value::Number(n) => {
            let text = n.to_string();
            let decimal = if text.contains(['e', 'E']) {
                Decimal::from_scientific(&text).ok()?
            } else {
                text.parse::<Decimal>().ok()?
            };
            Some(Money::of(decimal))
        }
        serde_json::Value::String(s) => s.parse().ok(),
        _ => None,
    }
}
