//! Card Authorizer - virtual card issuing and transaction authorization
//!
//! # Modules
//!
//! - [`money`] - Exact 2-digit decimal amounts (banker's rounding)
//! - [`card`] - Card value objects, aggregate, registries and card service
//! - [`authorization`] - Ordered veto rules for debit requests
//! - [`ledger`] - Authorize-and-debit with optimistic compare-and-swap retry
//! - [`gateway`] - axum HTTP boundary
//! - [`db`] - PostgreSQL pool
//! - [`config`] / [`logging`] - Runtime configuration and tracing setup

// Core value type - must be first!
pub mod money;

// Domain
pub mod authorization;
pub mod card;
pub mod ledger;

// Infrastructure
pub mod config;
pub mod db;
pub mod gateway;
pub mod logging;

// Convenient re-exports at crate root
pub use authorization::{AuthorizationChain, AuthorizationRule, Rejection, TransactionRequest};
pub use card::{
    Card, CardId, CardNumber, CardRegistry, CardService, CardServiceError, InMemoryCardRegistry,
    PgCardRegistry, Pin, PinHasher, RegistryError,
};
pub use ledger::{DebitReceipt, LedgerError, LedgerService, RetryPolicy};
pub use money::{Money, MoneyError};
