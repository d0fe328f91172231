//! Gateway types module
//!
//! ## Submodules
//! - [`request`]: Request DTOs and their conversion into core types
//! - [`response`]: Response wrapper and error codes

pub mod request;
pub mod response;

pub use request::{CreateCardPayload, TransactionPayload};
pub use response::{ApiResponse, FieldErrors, error_codes};
