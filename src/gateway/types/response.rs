//! API Response types and error codes
//!
//! The card endpoints answer with their historical bodies (echoed payload,
//! bare balance string, `OK` / error code text). `ApiResponse<T>` wraps
//! everything else: validation failures, server faults and health.

use std::collections::BTreeMap;

use serde::Serialize;
use utoipa::ToSchema;

// ============================================================================
// Unified API Response Format
// ============================================================================

/// Unified API response wrapper
///
/// - code: 0 = success, non-zero = error code
/// - msg: short message description
/// - data: payload on success, field errors on validation failure
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response code: 0 for success, non-zero for errors
    #[schema(example = 0)]
    pub code: i32,
    /// Response message
    #[schema(example = "ok")]
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Create success response
    pub fn success(data: T) -> Self {
        Self {
            code: 0,
            msg: "ok".to_string(),
            data: Some(data),
        }
    }

    /// Create error response
    pub fn error(code: i32, msg: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            code,
            msg: msg.into(),
            data: None,
        }
    }
}

/// Field name -> validation message
pub type FieldErrors = BTreeMap<String, String>;

impl ApiResponse<FieldErrors> {
    pub fn invalid_fields(errors: FieldErrors) -> Self {
        Self {
            code: error_codes::INVALID_PARAMETER,
            msg: "validation failed".to_string(),
            data: Some(errors),
        }
    }
}

// ============================================================================
// Error Codes
// ============================================================================

/// Standard API error codes
pub mod error_codes {
    pub const SUCCESS: i32 = 0;

    // Client errors (1xxx)
    pub const INVALID_PARAMETER: i32 = 1001;
    pub const MALFORMED_BODY: i32 = 1002;

    // Server errors (5xxx)
    pub const INTERNAL_ERROR: i32 = 5000;
    pub const SERVICE_UNAVAILABLE: i32 = 5001;
    pub const STORAGE_ERROR: i32 = 5002;
}
