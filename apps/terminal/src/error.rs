//! # Application Error Type
//!
//! Everything that can stop the terminal.
//!
//! ```text
//! startup     ── MissingArguments / MissingFileName ──► stdout, exit 1
//!             ── Database (open or migrate failed) ───► stdout, exit 1
//! menu loop   ── Io (stdin/stdout broken) ─────────────► exit 1
//! ```
//!
//! Refused banking operations never reach this type; the menu prints them
//! and keeps going.

use bank_db::DbError;
use thiserror::Error;

/// Terminal application errors.
#[derive(Debug, Error)]
pub enum AppError {
    /// No arguments at all.
    #[error("arguments missing -fileName")]
    MissingArguments,

    /// `-fileName` absent, or given without a value.
    #[error("missing fileName argument")]
    MissingFileName,

    /// Database could not be opened or migrated.
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    /// Reading the keyboard or writing the screen failed.
    #[error("Terminal I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for the terminal application.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_startup_messages() {
        assert_eq!(
            AppError::MissingArguments.to_string(),
            "arguments missing -fileName"
        );
        assert_eq!(
            AppError::MissingFileName.to_string(),
            "missing fileName argument"
        );
    }

    #[test]
    fn test_from_db_error() {
        let err: AppError = DbError::ConnectionFailed("locked".to_string()).into();
        assert!(matches!(err, AppError::Database(_)));
    }
}
