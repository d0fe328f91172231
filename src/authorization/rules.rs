//! Standard authorization rules

use tracing::debug;

use super::error::Rejection;
use super::{AuthorizationRule, TransactionRequest};
use crate::card::Card;
use crate::money::Money;

/// Vetoes requests whose card number did not resolve to a card
pub struct CardExists;

impl AuthorizationRule for CardExists {
    fn name(&self) -> &'static str {
        "card_exists"
    }

    fn authorize(
        &self,
        _request: &TransactionRequest,
        card: Option<&Card>,
    ) -> Result<(), Rejection> {
        card.map(|_| ()).ok_or(Rejection::CardNotFound)
    }
}

/// Vetoes a missing or non-matching PIN
pub struct PasswordValid;

impl AuthorizationRule for PasswordValid {
    fn name(&self) -> &'static str {
        "password_valid"
    }

    fn authorize(
        &self,
        request: &TransactionRequest,
        card: Option<&Card>,
    ) -> Result<(), Rejection> {
        let card = card.ok_or(Rejection::CardNotFound)?;
        if request.pin_matches(&card.pin) {
            Ok(())
        } else {
            Err(Rejection::InvalidPin)
        }
    }
}

/// Vetoes absent, non-positive or uncovered amounts
pub struct SufficientBalance;

impl AuthorizationRule for SufficientBalance {
    fn name(&self) -> &'static str {
        "sufficient_balance"
    }

    fn authorize(
        &self,
        request: &TransactionRequest,
        card: Option<&Card>,
    ) -> Result<(), Rejection> {
        let card = card.ok_or(Rejection::CardNotFound)?;
        let amount = request.amount.ok_or(Rejection::InvalidAmount)?;

        if !amount.is_greater_than(&Money::zero()) {
            return Err(Rejection::InvalidAmount);
        }
        if amount.is_greater_than(&card.balance) {
            debug!(
                card = %card.number,
                balance = %card.balance,
                requested = %amount,
                "Amount exceeds balance"
            );
            return Err(Rejection::InsufficientBalance);
        }
        Ok(())
    }
}
