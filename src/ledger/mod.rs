//! Ledger core
//!
//! Authorizes a debit against a card snapshot and persists it with a
//! version-checked write, retrying from a fresh read on conflicts.

pub mod error;
pub mod retry;
pub mod service;

pub use error::LedgerError;
pub use retry::RetryPolicy;
pub use service::{DebitReceipt, LedgerService};
