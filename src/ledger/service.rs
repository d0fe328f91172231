//! Authorize-and-debit with optimistic retry
//!
//! ```text
//! ┌────────┐   ┌───────────┐   ┌──────────┐   ┌─────────────┐
//! │  read  │──▶│ authorize │──▶│ subtract │──▶│ CAS(version)│──▶ committed
//! └────────┘   └───────────┘   └──────────┘   └─────────────┘
//!     ▲                                              │ conflict
//!     └──────────────── backoff ◀────────────────────┘
//! ```
//!
//! A conflict discards the whole snapshot, including the authorization
//! decision: the competing write may have made the amount uncovered.

use std::sync::Arc;

use tokio::task::spawn_blocking;
use tokio::time::{Instant, sleep, timeout_at};
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use super::error::LedgerError;
use super::retry::RetryPolicy;
use crate::authorization::{AuthorizationChain, TransactionRequest};
use crate::card::{Card, CardId, CardRegistry, RegistryError};
use crate::money::Money;

/// A committed debit
#[derive(Debug, Clone, PartialEq)]
pub struct DebitReceipt {
    pub transaction_id: Uuid,
    pub card_id: CardId,
    pub new_balance: Money,
    /// Card version after the write
    pub version: i64,
    /// Attempts used, 1 when there was no conflict
    pub attempts: u32,
}

enum Attempt {
    Committed(Card),
    Conflict,
    /// The snapshot read did not finish before the deadline; nothing written
    TimedOut,
}

pub struct LedgerService {
    registry: Arc<dyn CardRegistry>,
    chain: Arc<AuthorizationChain>,
    policy: RetryPolicy,
}

impl LedgerService {
    pub fn new(
        registry: Arc<dyn CardRegistry>,
        chain: AuthorizationChain,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            registry,
            chain: Arc::new(chain),
            policy,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Authorize a request and debit the card
    ///
    /// Either commits exactly one balance write or returns an error with no
    /// write applied. The deadline is checked between attempts and bounds the
    /// snapshot read, never an issued write: a write is always awaited until
    /// its outcome is known.
    pub async fn authorize_and_debit(
        &self,
        request: &TransactionRequest,
    ) -> Result<DebitReceipt, LedgerError> {
        let transaction_id = Uuid::new_v4();
        let span = info_span!(
            "debit",
            %transaction_id,
            card = %request.card_number,
            registry = self.registry.name()
        );
        self.run(request, transaction_id).instrument(span).await
    }

    async fn run(
        &self,
        request: &TransactionRequest,
        transaction_id: Uuid,
    ) -> Result<DebitReceipt, LedgerError> {
        let deadline = Instant::now() + self.policy.timeout;
        let mut attempts = 0u32;

        loop {
            attempts += 1;

            if Instant::now() >= deadline {
                warn!(attempts, "Debit timed out before the next attempt");
                return Err(LedgerError::Contention { attempts });
            }

            match self.attempt(request, transaction_id, deadline).await? {
                Attempt::Committed(card) => {
                    info!(
                        card_id = %card.id,
                        balance = %card.balance,
                        version = card.version,
                        attempts,
                        "Debit committed"
                    );
                    return Ok(DebitReceipt {
                        transaction_id,
                        card_id: card.id,
                        new_balance: card.balance,
                        version: card.version,
                        attempts,
                    });
                }
                Attempt::TimedOut => {
                    warn!(attempts, "Debit timed out reading the card");
                    return Err(LedgerError::Contention { attempts });
                }
                Attempt::Conflict => {
                    if attempts >= self.policy.max_attempts {
                        warn!(attempts, "Retry budget exhausted");
                        return Err(LedgerError::Contention { attempts });
                    }
                    let delay = self.policy.backoff(attempts);
                    if Instant::now() + delay >= deadline {
                        warn!(attempts, "No time left for another attempt");
                        return Err(LedgerError::Contention { attempts });
                    }
                    debug!(attempts, ?delay, "Version conflict, retrying from a fresh read");
                    sleep(delay).await;
                }
            }
        }
    }

    async fn attempt(
        &self,
        request: &TransactionRequest,
        write_id: Uuid,
        deadline: Instant,
    ) -> Result<Attempt, LedgerError> {
        let read = timeout_at(deadline, self.registry.find_by_number(&request.card_number)).await;
        let card = match read {
            Ok(found) => found.map_err(|e| LedgerError::Storage(e.to_string()))?,
            Err(_) => return Ok(Attempt::TimedOut),
        };

        let card = self.authorize(request, card).await?;

        let card = card.ok_or_else(|| {
            LedgerError::Internal("authorization passed without a card".to_string())
        })?;
        let amount = request.amount.ok_or_else(|| {
            LedgerError::Internal("authorization passed without an amount".to_string())
        })?;
        let new_balance = card.balance.subtract(&amount).map_err(|e| {
            LedgerError::Internal(format!("debit after authorization failed: {}", e))
        })?;

        // Not bounded by the deadline: once issued, the write must resolve
        match self
            .registry
            .compare_and_swap_balance(card.id, card.version, new_balance, write_id)
            .await
        {
            Ok(updated) => Ok(Attempt::Committed(updated)),
            Err(RegistryError::VersionConflict { .. }) => Ok(Attempt::Conflict),
            Err(RegistryError::Storage(cause)) => {
                self.resolve_failed_write(&card, write_id, cause).await
            }
            Err(e) => Err(LedgerError::Storage(e.to_string())),
        }
    }

    /// Run the chain on the blocking pool; the PIN check hashes with argon2
    async fn authorize(
        &self,
        request: &TransactionRequest,
        card: Option<Card>,
    ) -> Result<Option<Card>, LedgerError> {
        let chain = Arc::clone(&self.chain);
        let request = request.clone();
        let (verdict, card) = spawn_blocking(move || {
            let verdict = chain.authorize(&request, card.as_ref());
            (verdict, card)
        })
        .await
        .map_err(|e| LedgerError::Internal(format!("authorization task failed: {}", e)))?;

        verdict?;
        Ok(card)
    }

    /// Decide what a failed write did by reading the card back
    ///
    /// - last write id is ours: the write landed
    /// - version unchanged: nothing was written
    /// - version + 1 by another writer: ours lost the race, retry
    /// - anything else: the outcome cannot be determined
    async fn resolve_failed_write(
        &self,
        before: &Card,
        write_id: Uuid,
        cause: String,
    ) -> Result<Attempt, LedgerError> {
        warn!(
            card_id = %before.id,
            version = before.version,
            error = %cause,
            "Balance write failed, re-reading card"
        );

        let current = self
            .registry
            .find_by_number(&before.number)
            .await
            .map_err(|e| {
                LedgerError::Storage(format!(
                    "outcome unknown: write failed ({}) and re-read failed ({})",
                    cause, e
                ))
            })?;

        match current {
            Some(card) if card.last_write_id == Some(write_id) => {
                warn!(card_id = %card.id, "Write reported an error but was applied");
                Ok(Attempt::Committed(card))
            }
            Some(card) if card.version == before.version => Err(LedgerError::Storage(cause)),
            Some(card) if card.version == before.version + 1 => {
                debug!(card_id = %card.id, "Another write took the version, retrying");
                Ok(Attempt::Conflict)
            }
            _ => Err(LedgerError::Storage(format!(
                "outcome unknown after failed write: {}",
                cause
            ))),
        }
    }
}
