//! # bank-service: Banking Service for the Terminal Bank
//!
//! Ties number generation (bank-core) to storage (bank-db) and enforces
//! the rules the store does not: unique issuance, PIN checks and transfer
//! preconditions.
//!
//! ## Module Organization
//!
//! - [`config`] - Service configuration (bank id, issuance budget)
//! - [`error`] - Service error types
//! - [`issuer`] - Unique card issuance
//! - [`service`] - The [`BankService`] API

pub mod config;
pub mod error;
pub mod issuer;
pub mod service;

pub use config::ServiceConfig;
pub use error::{ServiceError, ServiceResult};
pub use issuer::CardIssuer;
pub use service::BankService;
