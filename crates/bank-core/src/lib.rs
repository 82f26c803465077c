//! # bank-core: Pure Banking Logic
//!
//! This crate holds the logic of the terminal bank that needs no storage:
//! card number arithmetic, number generation and input validation.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Terminal Bank Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    apps/terminal (menu loop)                    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 bank-service (BankService)                      │   │
//! │  └──────────────┬───────────────────────────────┬──────────────────┘   │
//! │                 │                               │                       │
//! │  ┌──────────────▼──────────────────┐  ┌─────────▼──────────────────┐   │
//! │  │    ★ bank-core (THIS CRATE) ★   │  │   bank-db (SQLite store)   │   │
//! │  │  luhn • generator • validation  │  │  card + account tables     │   │
//! │  └─────────────────────────────────┘  └────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`luhn`] - Check digit computation and verification
//! - [`generator`] - Account numbers, PINs, card number assembly
//! - [`types`] - Card and Account records
//! - [`validation`] - PIN, amount and card-number format checks
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use bank_core::{generator, luhn};
//!
//! let number = generator::card_number("400000", 493832089).unwrap();
//! assert_eq!(number, "4000004938320896");
//! assert!(luhn::is_valid(&number));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod generator;
pub mod luhn;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use generator::{NumberSource, RandomNumberSource};
pub use types::{Account, Card};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Bank identification number printed at the front of every issued card.
pub const DEFAULT_BANK_ID: &str = "400000";

/// Number of digits in an account number.
pub const ACCOUNT_NUMBER_LEN: usize = 9;

/// Number of digits in a PIN.
pub const PIN_LEN: usize = 4;

/// Smallest account number the generator may draw.
pub const MIN_ACCOUNT_NUMBER: u32 = 100_000_000;

/// Largest account number the generator may draw.
pub const MAX_ACCOUNT_NUMBER: u32 = 999_999_999;

/// Smallest PIN the generator may draw.
pub const MIN_PIN: u16 = 1000;

/// Largest PIN the generator may draw.
pub const MAX_PIN: u16 = 9999;
