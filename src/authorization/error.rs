//! Business rejections raised by authorization rules

use thiserror::Error;

/// Veto returned by the first failing rule
///
/// The codes are part of the wire contract and are reported verbatim.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    #[error("Card not found")]
    CardNotFound,

    #[error("Invalid PIN")]
    InvalidPin,

    #[error("Amount must be present and greater than zero")]
    InvalidAmount,

    #[error("Insufficient balance")]
    InsufficientBalance,
}

impl Rejection {
    pub fn code(&self) -> &'static str {
        match self {
            Rejection::CardNotFound => "CARD_NOT_FOUND",
            Rejection::InvalidPin => "INVALID_PIN",
            Rejection::InvalidAmount => "INVALID_AMOUNT",
            Rejection::InsufficientBalance => "INSUFFICIENT_BALANCE",
        }
    }

    pub fn http_status(&self) -> u16 {
        422
    }
}
