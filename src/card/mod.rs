//! Card management
//!
//! Value objects, the card aggregate, the registry boundary with its two
//! implementations, and the service used by the gateway for card creation
//! and balance queries.

pub mod memory;
pub mod models;
pub mod postgres;
pub mod registry;
pub mod service;
pub mod validation;

pub use memory::InMemoryCardRegistry;
pub use models::{Card, CardId, NewCard};
pub use postgres::PgCardRegistry;
pub use registry::{CardRegistry, RegistryError};
pub use service::{CardService, CardServiceError, CreateCardPayload};
pub use validation::{CardNumber, Pin, PinHasher, ValidationError};
