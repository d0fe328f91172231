//! Card Registry
//!
//! Storage boundary for cards. Implementations must make each method a single
//! atomic step at the storage layer:
//! - `create_if_absent` never overwrites an existing card number
//! - `compare_and_swap_balance` applies only when the stored version equals
//!   `expected_version`, and bumps the version by one when it does. The same
//!   step records `write_id` on the card, so a caller whose write reported an
//!   error can tell whether that write is the one that landed.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use super::models::{Card, CardId, NewCard};
use super::validation::CardNumber;
use crate::money::Money;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Card already exists: {0}")]
    AlreadyExists(String),

    #[error("Version conflict on card {id}: expected version {expected}")]
    VersionConflict { id: CardId, expected: i64 },

    #[error("Card not found: {0}")]
    NotFound(CardId),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<sqlx::Error> for RegistryError {
    fn from(e: sqlx::Error) -> Self {
        RegistryError::Storage(e.to_string())
    }
}

#[async_trait]
pub trait CardRegistry: Send + Sync {
    /// Registry name for logging
    fn name(&self) -> &'static str;

    /// Point-in-time read of a card, including its version token
    async fn find_by_number(&self, number: &CardNumber) -> Result<Option<Card>, RegistryError>;

    /// Insert a new card with version 0
    ///
    /// Fails with `AlreadyExists` (carrying the masked number) if the number
    /// is taken.
    async fn create_if_absent(&self, card: NewCard) -> Result<Card, RegistryError>;

    /// Conditional balance write; returns the post-image on success
    ///
    /// The post-image carries `last_write_id == Some(write_id)`.
    async fn compare_and_swap_balance(
        &self,
        id: CardId,
        expected_version: i64,
        new_balance: Money,
        write_id: Uuid,
    ) -> Result<Card, RegistryError>;
}
