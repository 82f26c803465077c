//! # Validation Module
//!
//! Input validation utilities for the terminal bank.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Terminal (apps/terminal)                                     │
//! │  └── Parses numbers, re-prompts on garbage                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: BankService                                                  │
//! │  └── THIS MODULE: amounts, PIN and card-number format                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  └── NOT NULL / PRIMARY KEY constraints                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::{ACCOUNT_NUMBER_LEN, PIN_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a PIN: exactly 4 ASCII digits.
///
/// ## Example
/// ```rust
/// use bank_core::validation::validate_pin;
///
/// assert!(validate_pin("0420").is_ok());
/// assert!(validate_pin("42").is_err());
/// ```
pub fn validate_pin(pin: &str) -> ValidationResult<()> {
    validate_digits("pin", pin, PIN_LEN)
}

/// Validates an account number: exactly 9 ASCII digits.
pub fn validate_account_number(account: &str) -> ValidationResult<()> {
    validate_digits("account number", account, ACCOUNT_NUMBER_LEN)
}

/// Validates that a card number is a non-empty run of ASCII digits.
///
/// Length and check digit are not checked here; see [`crate::luhn::is_valid`].
pub fn validate_card_number_format(number: &str) -> ValidationResult<()> {
    if number.is_empty() {
        return Err(ValidationError::Required {
            field: "card number".to_string(),
        });
    }

    if !number.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "card number".to_string(),
            reason: "must contain only digits".to_string(),
        });
    }

    Ok(())
}

fn validate_digits(field: &str, value: &str, len: usize) -> ValidationResult<()> {
    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.len() != len {
        return Err(ValidationError::WrongLength {
            field: field.to_string(),
            expected: len,
        });
    }

    if !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must contain only digits".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an income amount in minor units.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (no-op deposit)
pub fn validate_income_amount(amount: i64) -> ValidationResult<()> {
    if amount < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "income".to_string(),
        });
    }

    Ok(())
}

/// Validates a transfer amount in minor units.
///
/// ## Rules
/// - Must be positive (> 0)
pub fn validate_transfer_amount(amount: i64) -> ValidationResult<()> {
    if amount <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "transfer amount".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
