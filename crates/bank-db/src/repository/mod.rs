//! # Repository Module
//!
//! Database repository implementations for the terminal bank.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  BankService                                                           │
//! │       │                                                                 │
//! │       │  db.cards().transfer(origin, dest, 200)                        │
//! │       ▼                                                                 │
//! │  CardRepository                                                        │
//! │  ├── card_exists / get_card / get_account / get_card_by_account        │
//! │  ├── create_card_and_account                                           │
//! │  ├── update_balance / transfer                                         │
//! │  └── delete_account                                                    │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database (card, account, id_sequence)                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`CardRepository`](card::CardRepository) - Cards, accounts and balances

pub mod card;
