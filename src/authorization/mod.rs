//! Transaction authorization
//!
//! An [`AuthorizationChain`] is an ordered, immutable list of veto rules.
//! Rules run in order and the first veto wins, so the reported code follows
//! a fixed precedence:
//!
//! ```text
//! CardExists ──▶ PasswordValid ──▶ SufficientBalance
//! CARD_NOT_FOUND  INVALID_PIN       INVALID_AMOUNT / INSUFFICIENT_BALANCE
//! ```
//!
//! Rules only read the request and the card snapshot. They never write.

pub mod error;
pub mod rules;

pub use error::Rejection;
pub use rules::{CardExists, PasswordValid, SufficientBalance};

use std::sync::{Arc, OnceLock};

use tracing::debug;

use crate::card::{Card, CardNumber, Pin};
use crate::money::Money;

/// A debit request as seen by the core
///
/// `amount` is already rounded to 2 digits, so the value checked against the
/// balance is the value debited.
///
/// The PIN check result is remembered for the lifetime of the request and
/// shared by its clones, so a debit retried after a version conflict hashes
/// the PIN once.
#[derive(Debug, Clone)]
pub struct TransactionRequest {
    pub card_number: CardNumber,
    pub pin: Option<String>,
    pub amount: Option<Money>,
    pin_verdict: Arc<OnceLock<PinVerdict>>,
}

/// Outcome of one PIN verification, keyed by the inputs that produced it
#[derive(Debug)]
struct PinVerdict {
    hash: String,
    raw: String,
    matches: bool,
}

impl TransactionRequest {
    pub fn new(card_number: CardNumber, pin: Option<String>, amount: Option<Money>) -> Self {
        Self {
            card_number,
            pin,
            amount,
            pin_verdict: Arc::new(OnceLock::new()),
        }
    }

    /// Whether the submitted PIN matches `stored`
    ///
    /// A missing PIN never matches. Only the first verification is cached;
    /// any other hash or PIN is verified afresh.
    pub fn pin_matches(&self, stored: &Pin) -> bool {
        let Some(raw) = self.pin.as_deref() else {
            return false;
        };

        if let Some(cached) = self.pin_verdict.get() {
            if cached.hash == stored.hash_str() && cached.raw == raw {
                return cached.matches;
            }
            return stored.matches(raw);
        }

        let matches = stored.matches(raw);
        let _ = self.pin_verdict.set(PinVerdict {
            hash: stored.hash_str().to_string(),
            raw: raw.to_string(),
            matches,
        });
        matches
    }

    /// Cached PIN verdict, if a verification already ran
    pub fn cached_pin_verdict(&self) -> Option<bool> {
        self.pin_verdict.get().map(|v| v.matches)
    }
}

/// A single veto check
pub trait AuthorizationRule: Send + Sync {
    /// Rule name for logging
    fn name(&self) -> &'static str;

    /// `card` is `None` when the number did not resolve to a card
    fn authorize(&self, request: &TransactionRequest, card: Option<&Card>)
    -> Result<(), Rejection>;
}

pub struct AuthorizationChain {
    rules: Vec<Box<dyn AuthorizationRule>>,
}

impl AuthorizationChain {
    pub fn new(rules: Vec<Box<dyn AuthorizationRule>>) -> Self {
        Self { rules }
    }

    /// CardExists, PasswordValid, SufficientBalance
    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(CardExists),
            Box::new(PasswordValid),
            Box::new(SufficientBalance),
        ])
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Run every rule in order, stopping at the first veto
    pub fn authorize(
        &self,
        request: &TransactionRequest,
        card: Option<&Card>,
    ) -> Result<(), Rejection> {
        for rule in &self.rules {
            if let Err(rejection) = rule.authorize(request, card) {
                debug!(
                    rule = rule.name(),
                    code = rejection.code(),
                    card = %request.card_number,
                    "Transaction vetoed"
                );
                return Err(rejection);
            }
        }
        Ok(())
    }
}

impl Default for AuthorizationChain {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{CardId, PinHasher};
    use chrono::Utc;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn card(balance: &str) -> Card {
        Card {
            id: CardId(7),
            number: CardNumber::parse("1234567890123456").unwrap(),
            pin: PinHasher::new(1024, 1).unwrap().hash("1234").unwrap(),
            balance: balance.parse().unwrap(),
            version: 3,
            last_write_id: None,
            created_at: Utc::now(),
        }
    }

    fn request(pin: Option<&str>, amount: Option<&str>) -> TransactionRequest {
        TransactionRequest::new(
            CardNumber::parse("1234567890123456").unwrap(),
            pin.map(str::to_string),
            amount.map(|a| a.parse().unwrap()),
        )
    }

    #[test]
    fn test_standard_order() {
        assert_eq!(
            AuthorizationChain::standard().rule_names(),
            vec!["card_exists", "password_valid", "sufficient_balance"]
        );
    }

    #[test]
    fn test_accepts_valid_request() {
        let chain = AuthorizationChain::standard();
        let c = card("500.00");
        assert_eq!(
            chain.authorize(&request(Some("1234"), Some("500.00")), Some(&c)),
            Ok(())
        );
    }

    #[test]
    fn test_missing_card_wins_over_everything() {
        let chain = AuthorizationChain::standard();
        for (pin, amount) in [
            (None, None),
            (Some("0000"), Some("-5")),
            (Some("1234"), Some("99999")),
            (Some("1234"), Some("1.00")),
        ] {
            assert_eq!(
                chain.authorize(&request(pin, amount), None),
                Err(Rejection::CardNotFound)
            );
        }
    }

    #[test]
    fn test_wrong_pin_wins_over_bad_amount() {
        let chain = AuthorizationChain::standard();
        let c = card("500.00");
        for amount in [None, Some("0"), Some("-1"), Some("1000.00")] {
            assert_eq!(
                chain.authorize(&request(Some("9999"), amount), Some(&c)),
                Err(Rejection::InvalidPin)
            );
        }
    }

    #[test]
    fn test_amount_checked_after_pin() {
        let chain = AuthorizationChain::standard();
        let c = card("500.00");
        assert_eq!(
            chain.authorize(&request(Some("1234"), None), Some(&c)),
            Err(Rejection::InvalidAmount)
        );
        assert_eq!(
            chain.authorize(&request(Some("1234"), Some("500.01")), Some(&c)),
            Err(Rejection::InsufficientBalance)
        );
    }

    struct CountingRule {
        calls: Arc<AtomicUsize>,
    }

    impl AuthorizationRule for CountingRule {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn authorize(&self, _: &TransactionRequest, _: Option<&Card>) -> Result<(), Rejection> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn test_first_veto_stops_the_chain() {
        let calls = Arc::new(AtomicUsize::new(0));
        let chain = AuthorizationChain::new(vec![
            Box::new(CardExists),
            Box::new(CountingRule {
                calls: calls.clone(),
            }),
        ]);

        assert_eq!(
            chain.authorize(&request(None, None), None),
            Err(Rejection::CardNotFound)
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let c = card("1.00");
        assert_eq!(chain.authorize(&request(None, None), Some(&c)), Ok(()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_chain_without_card_exists_still_reports_not_found() {
        let chain = AuthorizationChain::new(vec![
            Box::new(SufficientBalance),
            Box::new(PasswordValid),
        ]);
        assert_eq!(
            chain.authorize(&request(Some("1234"), Some("1.00")), None),
            Err(Rejection::CardNotFound)
        );
    }

    #[test]
    fn test_pin_verdict_is_cached_per_request() {
        let c = card("500.00");
        let req = request(Some("1234"), Some("1.00"));
        assert_eq!(req.cached_pin_verdict(), None);

        assert!(req.pin_matches(&c.pin));
        assert_eq!(req.cached_pin_verdict(), Some(true));

        // Clones share the verdict
        let retried = req.clone();
        assert_eq!(retried.cached_pin_verdict(), Some(true));
        assert!(retried.pin_matches(&c.pin));

        let wrong = request(Some("9999"), None);
        assert!(!wrong.pin_matches(&c.pin));
        assert!(!wrong.pin_matches(&c.pin));
        assert_eq!(wrong.cached_pin_verdict(), Some(false));
    }

    #[test]
    fn test_cached_verdict_not_reused_for_other_inputs() {
        let c = card("500.00");
        let other_hash = PinHasher::new(1024, 1).unwrap().hash("4321").unwrap();

        let mut req = request(Some("1234"), None);
        assert!(req.pin_matches(&c.pin));
        assert!(!req.pin_matches(&other_hash));

        req.pin = Some("4321".to_string());
        assert!(req.pin_matches(&other_hash));
        assert!(!req.pin_matches(&c.pin));

        req.pin = None;
        assert!(!req.pin_matches(&c.pin));
    }

    #[test]
    fn test_authorization_does_not_mutate_card() {
        let chain = AuthorizationChain::standard();
        let c = card("500.00");
        let before = c.clone();
        chain
            .authorize(&request(Some("1234"), Some("100.00")), Some(&c))
            .unwrap();
        assert_eq!(c, before);
    }
}
