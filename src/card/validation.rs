//! Value objects for card numbers and PINs
//!
//! Fields are private to force validation through the public constructors.
//! A `CardNumber` is always normalized digits; a `Pin` only ever holds an
//! argon2 PHC hash, never the raw digits.

use std::fmt;

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

// ============================================================================
// Validation Errors
// ============================================================================

#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("Invalid length for {field}: expected {min}-{max} digits, got {actual}")]
    InvalidLength {
        field: &'static str,
        min: usize,
        max: usize,
        actual: usize,
    },

    #[error("Invalid format for {field} (expected: {expected})")]
    InvalidFormat {
        field: &'static str,
        expected: &'static str,
    },

    #[error("PIN hashing failed: {0}")]
    Hashing(String),
}

impl ValidationError {
    /// Name of the payload field the error refers to
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::Empty { field }
            | ValidationError::InvalidLength { field, .. }
            | ValidationError::InvalidFormat { field, .. } => field,
            ValidationError::Hashing(_) => "senha",
        }
    }
}

// ============================================================================
// CardNumber
// ============================================================================

/// Normalized card number (13-19 decimal digits)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CardNumber(String);

impl CardNumber {
    pub const MIN_DIGITS: usize = 13;
    pub const MAX_DIGITS: usize = 19;

    /// Validate a card number
    ///
    /// Only plain decimal digits are accepted. Separators are not stripped:
    /// `"1234 5678 9012 3456"` is rejected like any other stray character.
    ///
    /// # Examples
    /// ```
    /// use card_authorizer::card::CardNumber;
    ///
    /// let n = CardNumber::parse("1234567890123456").unwrap();
    /// assert_eq!(n.masked(), "123456XXXXXX3456");
    /// assert!(CardNumber::parse("1234-5678-9012-3456").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        if raw.is_empty() {
            return Err(ValidationError::Empty {
                field: "numeroCartao",
            });
        }

        if !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::InvalidFormat {
                field: "numeroCartao",
                expected: "decimal digits only",
            });
        }

        if !(Self::MIN_DIGITS..=Self::MAX_DIGITS).contains(&raw.len()) {
            return Err(ValidationError::InvalidLength {
                field: "numeroCartao",
                min: Self::MIN_DIGITS,
                max: Self::MAX_DIGITS,
                actual: raw.len(),
            });
        }

        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 6 and last 4 digits visible, the rest replaced by `X`
    pub fn masked(&self) -> String {
        let len = self.0.len();
        format!(
            "{}{}{}",
            &self.0[..6],
            "X".repeat(len - 10),
            &self.0[len - 4..]
        )
    }
}

impl fmt::Display for CardNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.masked())
    }
}

// ============================================================================
// Pin
// ============================================================================

/// Hashed card PIN
///
/// Equality compares hashes; use [`Pin::matches`] to check a raw PIN.
#[derive(Clone, PartialEq, Eq)]
pub struct Pin(String);

impl Pin {
    pub const MIN_DIGITS: usize = 4;
    pub const MAX_DIGITS: usize = 6;

    /// Wrap a hash loaded from storage
    pub fn from_hash(hash: impl Into<String>) -> Result<Self, ValidationError> {
        let hash = hash.into();
        if hash.trim().is_empty() {
            return Err(ValidationError::Empty { field: "senha" });
        }
        PasswordHash::new(&hash).map_err(|_| ValidationError::InvalidFormat {
            field: "senha",
            expected: "argon2 PHC string",
        })?;
        Ok(Self(hash))
    }

    /// Check a raw PIN against the stored hash
    pub fn matches(&self, raw: &str) -> bool {
        match PasswordHash::new(&self.0) {
            // Params come from the PHC string, so any hasher cost verifies
            Ok(parsed) => Argon2::default()
                .verify_password(raw.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                tracing::error!("Stored PIN hash is unreadable: {}", e);
                false
            }
        }
    }

    pub fn hash_str(&self) -> &str {
        &self.0
    }

    fn validate_raw(raw: &str) -> Result<(), ValidationError> {
        if raw.is_empty() {
            return Err(ValidationError::Empty { field: "senha" });
        }
        if !raw.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::InvalidFormat {
                field: "senha",
                expected: "decimal digits only",
            });
        }
        if !(Self::MIN_DIGITS..=Self::MAX_DIGITS).contains(&raw.len()) {
            return Err(ValidationError::InvalidLength {
                field: "senha",
                min: Self::MIN_DIGITS,
                max: Self::MAX_DIGITS,
                actual: raw.len(),
            });
        }
        Ok(())
    }
}

impl fmt::Debug for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Pin(****)")
    }
}

impl fmt::Display for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}

// ============================================================================
// PinHasher
// ============================================================================

/// Argon2id hasher with configurable cost
#[derive(Clone)]
pub struct PinHasher {
    argon2: Argon2<'static>,
}

impl PinHasher {
    /// Build a hasher with explicit memory (KiB) and iteration cost
    pub fn new(memory_kib: u32, iterations: u32) -> Result<Self, ValidationError> {
        let params = Params::new(memory_kib, iterations, 1, None)
            .map_err(|e| ValidationError::Hashing(e.to_string()))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Validate a raw PIN and return its salted hash
    pub fn hash(&self, raw: &str) -> Result<Pin, ValidationError> {
        Pin::validate_raw(raw)?;

        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(raw.as_bytes(), &salt)
            .map_err(|e| ValidationError::Hashing(e.to_string()))?
            .to_string();

        Ok(Pin(hash))
    }
}

impl Default for PinHasher {
    fn default() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_hasher() -> PinHasher {
        PinHasher::new(1024, 1).unwrap()
    }

    #[test]
    fn test_card_number_accepts_plain_digits() {
        let n = CardNumber::parse("1234567890123456").unwrap();
        assert_eq!(n.as_str(), "1234567890123456");
        assert_eq!(n, CardNumber::parse("1234567890123456").unwrap());
    }

    #[test]
    fn test_card_number_rejects_any_non_digit() {
        for raw in [
            "abc1234567890123",
            "1234-5678-9012-3456x",
            "1234 5678 9012 3456",
            "1234-5678-9012-3456",
            " 1234567890123456",
            "1234567890123456\n",
            "１２３４５６７８９０１２３",
            "+1234567890123",
        ] {
            assert_eq!(
                CardNumber::parse(raw),
                Err(ValidationError::InvalidFormat {
                    field: "numeroCartao",
                    expected: "decimal digits only",
                }),
                "{:?}",
                raw
            );
        }
    }

    #[test]
    fn test_card_number_length_bounds() {
        assert!(CardNumber::parse("1234567890123").is_ok()); // 13
        assert!(CardNumber::parse("1234567890123456789").is_ok()); // 19
        assert_eq!(
            CardNumber::parse("123456789012"),
            Err(ValidationError::InvalidLength {
                field: "numeroCartao",
                min: 13,
                max: 19,
                actual: 12
            })
        );
        assert!(CardNumber::parse("12345678901234567890").is_err()); // 20
    }

    #[test]
    fn test_card_number_rejects_empty_and_no_digits() {
        assert!(matches!(
            CardNumber::parse(""),
            Err(ValidationError::Empty { .. })
        ));
        assert!(matches!(
            CardNumber::parse("   "),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(matches!(
            CardNumber::parse("abcd-efgh"),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_card_number_masked() {
        let n = CardNumber::parse("1234567890123").unwrap();
        assert_eq!(n.masked(), "123456XXX0123");
        assert_eq!(n.to_string(), "123456XXX0123");

        let n = CardNumber::parse("1234567890123456789").unwrap();
        assert_eq!(n.masked(), "123456XXXXXXXXX6789");
    }

    #[test]
    fn test_pin_hash_and_match() {
        let pin = fast_hasher().hash("1234").unwrap();
        assert!(pin.hash_str().starts_with("$argon2id$"));
        assert!(pin.matches("1234"));
        assert!(!pin.matches("4321"));
        assert!(!pin.matches(""));
    }

    #[test]
    fn test_pin_hash_is_salted() {
        let hasher = fast_hasher();
        let a = hasher.hash("1234").unwrap();
        let b = hasher.hash("1234").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_pin_rejects_bad_shapes() {
        let hasher = fast_hasher();
        assert!(matches!(
            hasher.hash("123"),
            Err(ValidationError::InvalidLength { .. })
        ));
        assert!(matches!(
            hasher.hash("1234567"),
            Err(ValidationError::InvalidLength { .. })
        ));
        assert!(matches!(
            hasher.hash("12a4"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(matches!(
            hasher.hash(""),
            Err(ValidationError::Empty { .. })
        ));
    }

    #[test]
    fn test_pin_roundtrip_through_storage_form() {
        let pin = fast_hasher().hash("987654").unwrap();
        let loaded = Pin::from_hash(pin.hash_str()).unwrap();
        assert!(loaded.matches("987654"));
        assert!(Pin::from_hash("not-a-phc-string").is_err());
    }

    #[test]
    fn test_pin_never_displays_raw() {
        let pin = fast_hasher().hash("1234").unwrap();
        assert_eq!(pin.to_string(), "****");
        assert_eq!(format!("{:?}", pin), "Pin(****)");
    }
}
