//! Ledger error types

use thiserror::Error;

use crate::authorization::Rejection;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Business veto from the authorization chain; never retried
    #[error("Transaction rejected: {0}")]
    Rejected(#[from] Rejection),

    /// Retry budget exhausted while other writers kept winning
    #[error("Card under contention, gave up after {attempts} attempt(s)")]
    Contention { attempts: u32 },

    /// Logic defect, e.g. a debit going negative after authorization passed
    #[error("Internal consistency violation: {0}")]
    Internal(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl LedgerError {
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::Rejected(r) => r.code(),
            LedgerError::Contention { .. } => "CONTENTION",
            LedgerError::Internal(_) => "INTERNAL_ERROR",
            LedgerError::Storage(_) => "STORAGE_ERROR",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            LedgerError::Rejected(r) => r.http_status(),
            LedgerError::Contention { .. } => 503,
            LedgerError::Internal(_) | LedgerError::Storage(_) => 500,
        }
    }

    pub fn is_rejection(&self) -> bool {
        matches!(self, LedgerError::Rejected(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_and_status() {
        let rejected = LedgerError::from(Rejection::InsufficientBalance);
        assert_eq!(rejected.code(), "INSUFFICIENT_BALANCE");
        assert_eq!(rejected.http_status(), 422);
        assert!(rejected.is_rejection());

        let contention = LedgerError::Contention { attempts: 5 };
        assert_eq!(contention.code(), "CONTENTION");
        assert_eq!(contention.http_status(), 503);
        assert!(!contention.is_rejection());

        assert_eq!(LedgerError::Internal("x".into()).http_status(), 500);
        assert_eq!(LedgerError::Storage("x".into()).http_status(), 500);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            LedgerError::Contention { attempts: 3 }.to_string(),
            "Card under contention, gave up after 3 attempt(s)"
        );
        assert_eq!(
            LedgerError::Rejected(Rejection::InvalidPin).to_string(),
            "Transaction rejected: Invalid PIN"
        );
    }
}
