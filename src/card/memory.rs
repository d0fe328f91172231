//! In-process card registry
//!
//! Backed by `DashMap`. Each registry call touches one map shard under its
//! lock, which makes the conditional write atomic the same way a single
//! `UPDATE ... WHERE version = $n` is atomic in PostgreSQL.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;
use uuid::Uuid;

use super::models::{Card, CardId, NewCard};
use super::registry::{CardRegistry, RegistryError};
use super::validation::CardNumber;
use crate::money::Money;

pub struct InMemoryCardRegistry {
    cards: DashMap<CardId, Card>,
    /// Normalized card number -> id (uniqueness index)
    by_number: DashMap<String, CardId>,
    next_id: AtomicI64,
}

impl InMemoryCardRegistry {
    pub fn new() -> Self {
        Self {
            cards: DashMap::new(),
            by_number: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    pub fn len(&self) -> usize {
        self.by_number.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_number.is_empty()
    }
}

impl Default for InMemoryCardRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CardRegistry for InMemoryCardRegistry {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn find_by_number(&self, number: &CardNumber) -> Result<Option<Card>, RegistryError> {
        let id = match self.by_number.get(number.as_str()) {
            Some(id) => *id,
            None => return Ok(None),
        };
        Ok(self.cards.get(&id).map(|card| card.value().clone()))
    }

    async fn create_if_absent(&self, new: NewCard) -> Result<Card, RegistryError> {
        match self.by_number.entry(new.number.as_str().to_string()) {
            Entry::Occupied(_) => Err(RegistryError::AlreadyExists(new.number.masked())),
            Entry::Vacant(slot) => {
                let id = CardId(self.next_id.fetch_add(1, Ordering::SeqCst));
                let card = Card {
                    id,
                    number: new.number,
                    pin: new.pin,
                    balance: new.initial_balance,
                    version: 0,
                    last_write_id: None,
                    created_at: Utc::now(),
                };
                // Card row first, then the index entry that makes it visible
                self.cards.insert(id, card.clone());
                slot.insert(id);
                debug!(card_id = %id, card = %card.number, "Card created");
                Ok(card)
            }
        }
    }

    async fn compare_and_swap_balance(
        &self,
        id: CardId,
        expected_version: i64,
        new_balance: Money,
        write_id: Uuid,
    ) -> Result<Card, RegistryError> {
        let mut card = self
            .cards
            .get_mut(&id)
            .ok_or(RegistryError::NotFound(id))?;

        if card.version != expected_version {
            return Err(RegistryError::VersionConflict {
                id,
                expected: expected_version,
            });
        }

        card.balance = new_balance;
        card.version += 1;
        card.last_write_id = Some(write_id);
        Ok(card.value().clone())
    }
}
