//! Card Service
//!
//! Card creation and balance queries. Debits go through
//! [`crate::ledger::LedgerService`], never through here.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};
use utoipa::ToSchema;

use super::models::NewCard;
use super::registry::{CardRegistry, RegistryError};
use super::validation::{CardNumber, PinHasher, ValidationError};
use crate::money::Money;

/// Card creation request, echoed back on success and on duplicates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CreateCardPayload {
    #[serde(rename = "numeroCartao", default)]
    #[schema(example = "1234567890123456")]
    pub numero_cartao: String,
    #[serde(default)]
    #[schema(example = "1234")]
    pub senha: String,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CardServiceError {
    /// Carries the submitted payload so the caller can echo it back
    #[error("Card already exists")]
    AlreadyExists(CreateCardPayload),

    #[error("Card not found")]
    NotFound,

    #[error("Invalid card data: {0}")]
    Invalid(ValidationError),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl CardServiceError {
    pub fn http_status(&self) -> u16 {
        match self {
            CardServiceError::AlreadyExists(_) => 422,
            CardServiceError::NotFound => 404,
            CardServiceError::Invalid(_) => 400,
            CardServiceError::Internal(_) | CardServiceError::Storage(_) => 500,
        }
    }
}

impl From<ValidationError> for CardServiceError {
    fn from(e: ValidationError) -> Self {
        match e {
            ValidationError::Hashing(msg) => CardServiceError::Internal(msg),
            other => CardServiceError::Invalid(other),
        }
    }
}

pub struct CardService {
    registry: Arc<dyn CardRegistry>,
    hasher: PinHasher,
    initial_balance: Money,
}

impl CardService {
    pub fn new(registry: Arc<dyn CardRegistry>, hasher: PinHasher, initial_balance: Money) -> Self {
        Self {
            registry,
            hasher,
            initial_balance,
        }
    }

    pub fn initial_balance(&self) -> Money {
        self.initial_balance
    }

    /// Create a card with the configured initial balance
    ///
    /// Returns the submitted payload unchanged. A taken number yields
    /// `AlreadyExists` carrying the same payload; the existing card is left
    /// untouched.
    pub async fn create_card(
        &self,
        payload: CreateCardPayload,
    ) -> Result<CreateCardPayload, CardServiceError> {
        let number = CardNumber::parse(&payload.numero_cartao)?;
        let pin = self.hasher.hash(&payload.senha)?;

        let new_card = NewCard {
            number,
            pin,
            initial_balance: self.initial_balance,
        };

        match self.registry.create_if_absent(new_card).await {
            Ok(card) => {
                info!(
                    card_id = %card.id,
                    card = %card.number,
                    balance = %card.balance,
                    registry = self.registry.name(),
                    "Card issued"
                );
                Ok(payload)
            }
            Err(RegistryError::AlreadyExists(masked)) => {
                info!(card = %masked, "Card creation rejected: number already registered");
                Err(CardServiceError::AlreadyExists(payload))
            }
            Err(e) => {
                warn!(error = %e, "Card creation failed");
                Err(CardServiceError::Storage(e.to_string()))
            }
        }
    }

    /// Current balance of a card
    ///
    /// A malformed number cannot name a card and is reported as `NotFound`.
    pub async fn get_balance(&self, raw_number: &str) -> Result<Money, CardServiceError> {
        let number = CardNumber::parse(raw_number).map_err(|_| CardServiceError::NotFound)?;

        match self.registry.find_by_number(&number).await {
            Ok(Some(card)) => Ok(card.balance),
            Ok(None) => Err(CardServiceError::NotFound),
            Err(e) => {
                warn!(card = %number, error = %e, "Balance lookup failed");
                Err(CardServiceError::Storage(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::memory::InMemoryCardRegistry;

    fn service() -> CardService {
        CardService::new(
            Arc::new(InMemoryCardRegistry::new()),
            PinHasher::new(1024, 1).unwrap(),
            "500.00".parse().unwrap(),
        )
    }

    fn payload(number: &str, pin: &str) -> CreateCardPayload {
        CreateCardPayload {
            numero_cartao: number.to_string(),
            senha: pin.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_card_echoes_payload() {
        let service = service();
        let created = service
            .create_card(payload("1234567890123456", "1234"))
            .await
            .unwrap();
        assert_eq!(created, payload("1234567890123456", "1234"));

        let balance = service.get_balance("1234567890123456").await.unwrap();
        assert_eq!(balance.to_string(), "500.00");
    }

    #[tokio::test]
    async fn test_duplicate_returns_original_payload() {
        let service = service();
        service
            .create_card(payload("1234567890123456", "1234"))
            .await
            .unwrap();

        let err = service
            .create_card(payload("1234567890123456", "9999"))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            CardServiceError::AlreadyExists(payload("1234567890123456", "9999"))
        );
        assert_eq!(err.http_status(), 422);
    }

    #[tokio::test]
    async fn test_invalid_shapes_rejected() {
        let service = service();

        let err = service
            .create_card(payload("1234", "1234"))
            .await
            .unwrap_err();
        assert!(matches!(err, CardServiceError::Invalid(ref e) if e.field() == "numeroCartao"));
        assert_eq!(err.http_status(), 400);

        for garbage in ["abc1234567890123", "1234-5678-9012-3456x"] {
            let err = service
                .create_card(payload(garbage, "1234"))
                .await
                .unwrap_err();
            assert_eq!(err.http_status(), 400);
        }

        let err = service
            .create_card(payload("1234567890123456", "12"))
            .await
            .unwrap_err();
        assert!(matches!(err, CardServiceError::Invalid(ref e) if e.field() == "senha"));
    }

    #[tokio::test]
    async fn test_balance_of_unknown_or_malformed_number() {
        let service = service();
        assert_eq!(
            service.get_balance("9999999999999999").await,
            Err(CardServiceError::NotFound)
        );
        assert_eq!(
            service.get_balance("not-a-card").await,
            Err(CardServiceError::NotFound)
        );
    }
}
