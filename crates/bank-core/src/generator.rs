//! # Number Generation
//!
//! Random account numbers and PINs, and assembly of card numbers.
//!
//! ## Card Number Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   4 0 0 0 0 0 │ 4 9 3 8 3 2 0 8 9 │ 6                                  │
//! │   ─────────── │ ───────────────── │ ─                                  │
//! │   bank id     │ account number    │ Luhn check digit                   │
//! │   (6 digits)  │ (9 digits)        │ (1 digit)                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The randomness lives behind [`NumberSource`] so the issuance workflow can
//! be driven by a seeded generator in tests, or by a scripted one that forces
//! collisions.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::CoreResult;
use crate::luhn;
use crate::{MAX_ACCOUNT_NUMBER, MAX_PIN, MIN_ACCOUNT_NUMBER, MIN_PIN};

// =============================================================================
// Number Source
// =============================================================================

/// Source of account numbers and PINs.
pub trait NumberSource: Send {
    /// Draws an account number in `MIN_ACCOUNT_NUMBER..=MAX_ACCOUNT_NUMBER`.
    fn account_number(&mut self) -> u32;

    /// Draws a PIN in `MIN_PIN..=MAX_PIN`.
    fn pin(&mut self) -> u16;
}

/// Uniform random numbers from a single `StdRng`.
///
/// ## Usage
/// ```rust
/// use bank_core::{NumberSource, RandomNumberSource};
///
/// let mut source = RandomNumberSource::seeded(42);
/// let account = source.account_number();
/// assert!((100_000_000..=999_999_999).contains(&account));
/// ```
#[derive(Debug, Clone)]
pub struct RandomNumberSource {
    rng: StdRng,
}

impl RandomNumberSource {
    /// Creates a source seeded once from OS entropy.
    pub fn from_entropy() -> Self {
        RandomNumberSource {
            rng: StdRng::from_entropy(),
        }
    }

    /// Creates a reproducible source (for tests).
    pub fn seeded(seed: u64) -> Self {
        RandomNumberSource {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomNumberSource {
    fn default() -> Self {
        RandomNumberSource::from_entropy()
    }
}

impl NumberSource for RandomNumberSource {
    fn account_number(&mut self) -> u32 {
        self.rng.gen_range(MIN_ACCOUNT_NUMBER..=MAX_ACCOUNT_NUMBER)
    }

    fn pin(&mut self) -> u16 {
        self.rng.gen_range(MIN_PIN..=MAX_PIN)
    }
}

// =============================================================================
// Assembly
// =============================================================================

/// Builds a card number: bank id, account number, Luhn check digit.
///
/// ## Errors
/// `CoreError::InvalidInput` if `bank_id` is not all digits.
pub fn card_number(bank_id: &str, account_number: u32) -> CoreResult<String> {
    let prefix = format!("{}{}", bank_id, account_number);
    let digit = luhn::check_digit(&prefix)?;
    Ok(format!("{}{}", prefix, digit))
}

/// Formats a PIN as 4-digit text.
pub fn format_pin(pin: u16) -> String {
    format!("{:04}", pin)
}

// =============================================================================
// Unit Tests
// =============================================================================
