//! # Domain Types
//!
//! Records stored by the bank.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────────┐          ┌─────────────────────┐              │
//! │  │        Card         │   1:1    │       Account       │              │
//! │  │  ─────────────────  │◄────────►│  ─────────────────  │              │
//! │  │  id (surrogate)     │  same id │  id (= Card.id)     │              │
//! │  │  number (16 digits) │          │  account (9 digits) │              │
//! │  │  pin (4 digits)     │          └─────────────────────┘              │
//! │  │  balance (i64)      │                                               │
//! │  └─────────────────────┘                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every record has:
//! - `id`: integer surrogate key, assigned once and never reused
//! - Business ID: card number / account number, what the customer sees

// =============================================================================
// Card
// =============================================================================

/// A payment card and its balance.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Card {
    /// Surrogate key, shared with the linked [`Account`].
    pub id: i64,

    /// Card number: bank id + account number + check digit.
    pub number: String,

    /// 4-digit PIN, stored as text.
    pub pin: String,

    /// Balance in minor currency units.
    pub balance: i64,
}

impl Card {
    /// Compares a supplied PIN with the stored one (ASCII case-insensitive).
    pub fn pin_matches(&self, pin: &str) -> bool {
        self.pin.eq_ignore_ascii_case(pin.trim())
    }

    /// Returns true if the balance covers `amount`.
    pub fn can_cover(&self, amount: i64) -> bool {
        self.balance >= amount
    }
}

// =============================================================================
// Account
// =============================================================================

/// The account number behind a card.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Account {
    /// Same value as the linked [`Card::id`].
    pub id: i64,

    /// 9-digit account number.
    pub account: String,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn card() -> Card {
        Card {
            id: 1,
            number: "4000004938320896".to_string(),
            pin: "1234".to_string(),
            balance: 500,
        }
    }

    #[test]
    fn test_pin_matches() {
        let card = card();
        assert!(card.pin_matches("1234"));
        assert!(card.pin_matches(" 1234\n"));
        assert!(!card.pin_matches("4321"));
        assert!(!card.pin_matches(""));
    }

    #[test]
    fn test_can_cover() {
        let card = card();
        assert!(card.can_cover(500));
        assert!(card.can_cover(0));
        assert!(!card.can_cover(501));
    }
}
