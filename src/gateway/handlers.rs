//! HTTP handlers

pub mod card;
pub mod health;
pub mod transaction;

pub use card::{create_card, get_balance};
pub use health::{HealthResponse, health_check};
pub use transaction::submit_transaction;

