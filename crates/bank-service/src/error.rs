//! # Service Error Types
//!
//! What callers of [`BankService`](crate::BankService) see when an
//! operation is refused or fails.
//!
//! ```text
//! DbError::NotFound          → ServiceError::CardNotFound
//! DbError::InvalidAmount     → ServiceError::InvalidAmount
//! DbError::BalanceOverflow   → ServiceError::InvalidAmount
//! other DbError              → ServiceError::Store
//! CoreError::Validation(_)   → ServiceError::InvalidAmount / InvalidCardNumber
//! ```

use bank_core::{CoreError, ValidationError};
use bank_db::DbError;
use thiserror::Error;

/// Banking service errors.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// No card with this number.
    #[error("Card not found: {0}")]
    CardNotFound(String),

    /// Card number fails the Luhn check or is not all digits.
    #[error("Invalid card number: {0}")]
    InvalidCardNumber(String),

    /// Origin and destination of a transfer are the same card.
    #[error("Cannot transfer money to the same account")]
    SameAccount,

    /// Origin balance does not cover the transfer.
    #[error("Insufficient funds: available {available}, requested {requested}")]
    InsufficientFunds { available: i64, requested: i64 },

    /// Amount outside what the operation accepts.
    #[error("Invalid amount {amount}: {reason}")]
    InvalidAmount { amount: i64, reason: String },

    /// Issuance ran out of attempts without finding a free number.
    #[error("Could not issue a unique card after {attempts} attempts")]
    GenerationExhausted { attempts: u32 },

    /// Number generation or checksum failure.
    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    /// Storage failure.
    #[error("Store error: {0}")]
    Store(DbError),
}

impl ServiceError {
    /// Creates an InvalidAmount error from a failed validation.
    pub fn invalid_amount(amount: i64, err: ValidationError) -> Self {
        ServiceError::InvalidAmount {
            amount,
            reason: err.to_string(),
        }
    }

    /// Creates an InvalidAmount error for a balance that would overflow.
    pub fn balance_overflow(amount: i64) -> Self {
        ServiceError::InvalidAmount {
            amount,
            reason: "balance would exceed the maximum".to_string(),
        }
    }
}

impl From<DbError> for ServiceError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { id, .. } => ServiceError::CardNotFound(id),
            DbError::InvalidAmount(amount) => ServiceError::InvalidAmount {
                amount,
                reason: "must be positive".to_string(),
            },
            DbError::BalanceOverflow { delta, .. } => ServiceError::balance_overflow(delta),
            other => ServiceError::Store(other),
        }
    }
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_not_found_becomes_card_not_found() {
        let err: ServiceError = DbError::not_found("Card", "4000004938320896").into();
        assert!(matches!(err, ServiceError::CardNotFound(ref n) if n == "4000004938320896"));
    }

    #[test]
    fn test_other_db_errors_stay_store_errors() {
        let err: ServiceError = DbError::PoolExhausted.into();
        assert!(matches!(err, ServiceError::Store(DbError::PoolExhausted)));

        let err: ServiceError = DbError::consistency("card", "1", 2).into();
        assert!(matches!(err, ServiceError::Store(DbError::Consistency { .. })));
    }

    #[test]
    fn test_balance_overflow_becomes_invalid_amount() {
        let err: ServiceError = DbError::BalanceOverflow {
            number: "4000004938320896".to_string(),
            delta: 7,
        }
        .into();
        assert!(matches!(err, ServiceError::InvalidAmount { amount: 7, .. }));
    }

    #[test]
    fn test_messages() {
        let err = ServiceError::InsufficientFunds {
            available: 100,
            requested: 250,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient funds: available 100, requested 250"
        );
        assert_eq!(
            ServiceError::GenerationExhausted { attempts: 3 }.to_string(),
            "Could not issue a unique card after 3 attempts"
        );
    }
}
