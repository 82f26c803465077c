//! # Error Types
//!
//! Domain-specific error types for bank-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  bank-core errors (this file)                                          │
//! │  ├── CoreError        - Checksum and domain errors                     │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  bank-db errors (separate crate)                                       │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  bank-service errors (separate crate)                                  │
//! │  └── ServiceError     - What the terminal sees                         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ServiceError → Terminal           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A numeric string contained something other than decimal digits.
    ///
    /// ## When This Occurs
    /// - Computing a check digit over "4000ab"
    /// - Computing a check digit over an empty string
    #[error("Invalid digit string '{input}': {reason}")]
    InvalidInput { input: String, reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates an InvalidInput error for the given input.
    pub fn invalid_input(input: impl Into<String>, reason: impl Into<String>) -> Self {
        CoreError::InvalidInput {
            input: input.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before the store is touched.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field has the wrong number of characters.
    #[error("{field} must be exactly {expected} characters")]
    WrongLength { field: String, expected: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., letters in a card number).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
