//! Card aggregate

use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::validation::{CardNumber, Pin};
use crate::money::Money;

/// Registry-assigned card identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CardId(pub i64);

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Persisted card snapshot
///
/// `version` is the optimistic-lock token: every accepted balance write
/// bumps it by exactly one.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub id: CardId,
    pub number: CardNumber,
    pub pin: Pin,
    pub balance: Money,
    pub version: i64,
    /// Id of the write that produced the current balance, `None` until the
    /// first debit
    pub last_write_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Card {
    pub fn verify_pin(&self, raw: &str) -> bool {
        self.pin.matches(raw)
    }
}

/// Input for [`crate::card::CardRegistry::create_if_absent`]
#[derive(Debug, Clone)]
pub struct NewCard {
    pub number: CardNumber,
    pub pin: Pin,
    pub initial_balance: Money,
}
