//! # Banking Service
//!
//! The API the terminal talks to.
//!
//! ## Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Terminal menu              BankService                 CardRepository  │
//! │  ─────────────              ───────────                 ──────────────  │
//! │  1. Create an account ────► create_account ──► issuer ► create_card_... │
//! │  2. Log into account  ────► check_pin ─────────────────► get_card       │
//! │     1. Balance        ────► get_balance ───────────────► get_card       │
//! │     2. Add income     ────► add_income ────────────────► update_balance │
//! │     3. Do transfer    ────► check_transfer_target ─────► card_exists    │
//! │                       ────► transfer_money ────────────► transfer       │
//! │     4. Close account  ────► delete_account ────────────► delete_account │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Transfer preconditions (positive amount, distinct valid destination,
//! sufficient origin balance) are enforced here, so calling the service
//! directly can never overdraw a card.

use tracing::{debug, info};

use bank_core::validation::{
    validate_account_number, validate_card_number_format, validate_income_amount, validate_pin,
    validate_transfer_amount,
};
use bank_core::{luhn, Card, NumberSource, RandomNumberSource};
use bank_db::{CardRepository, Database};

use crate::config::ServiceConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::issuer::CardIssuer;

/// Banking operations over one database.
///
/// ## Usage
/// ```rust,ignore
/// let db = Database::new(DbConfig::new("card.s3db")).await?;
/// let bank = BankService::new(db, ServiceConfig::default());
///
/// let number = bank.create_account().await?;
/// bank.add_income(&number, 500).await?;
/// ```
#[derive(Debug)]
pub struct BankService {
    db: Database,
    cards: CardRepository,
    issuer: CardIssuer,
}

impl BankService {
    /// Creates a service with a number source seeded once from OS entropy.
    pub fn new(db: Database, config: ServiceConfig) -> Self {
        BankService::with_number_source(db, config, Box::new(RandomNumberSource::from_entropy()))
    }

    /// Creates a service drawing account numbers and PINs from `source`.
    pub fn with_number_source(
        db: Database,
        config: ServiceConfig,
        source: Box<dyn NumberSource>,
    ) -> Self {
        let cards = db.cards();
        let issuer = CardIssuer::new(cards.clone(), &config, source);
        BankService { db, cards, issuer }
    }

    /// Returns the underlying database handle.
    pub fn database(&self) -> &Database {
        &self.db
    }

    // =========================================================================
    // Cards
    // =========================================================================

    /// Issues a new card and account, returning the card number.
    pub async fn create_account(&self) -> ServiceResult<String> {
        let card = self.issuer.issue().await?;
        Ok(card.number)
    }

    /// Checks a PIN against the stored one.
    ///
    /// Unknown cards give `false`. Never writes.
    pub async fn check_pin(&self, card_number: &str, pin: &str) -> ServiceResult<bool> {
        if validate_card_number_format(card_number).is_err() || validate_pin(pin.trim()).is_err() {
            debug!(number = %card_number, "Malformed credentials");
            return Ok(false);
        }

        let matches = match self.cards.get_card(card_number).await? {
            Some(card) => card.pin_matches(pin),
            None => false,
        };

        debug!(number = %card_number, matches, "PIN checked");
        Ok(matches)
    }

    /// Returns true if the number passes the Luhn check.
    pub fn is_valid_card_number(&self, card_number: &str) -> bool {
        luhn::is_valid(card_number)
    }

    /// Returns true if a card with this number is stored.
    pub async fn card_present(&self, card_number: &str) -> ServiceResult<bool> {
        Ok(self.cards.get_card(card_number).await?.is_some())
    }

    /// Gets a card by number.
    pub async fn get_card(&self, card_number: &str) -> ServiceResult<Option<Card>> {
        Ok(self.cards.get_card(card_number).await?)
    }

    /// Gets the card linked to an account number.
    ///
    /// Anything other than nine digits cannot be an account number and
    /// gives `None` without a lookup.
    pub async fn get_card_by_account(&self, account_number: &str) -> ServiceResult<Option<Card>> {
        if validate_account_number(account_number).is_err() {
            return Ok(None);
        }

        Ok(self.cards.get_card_by_account(account_number).await?)
    }

    /// Returns the stored PIN, or `None` for an unknown card.
    pub async fn get_pin(&self, card_number: &str) -> ServiceResult<Option<String>> {
        Ok(self.cards.get_card(card_number).await?.map(|card| card.pin))
    }

    /// Returns the balance, or `None` for an unknown card.
    pub async fn get_balance(&self, card_number: &str) -> ServiceResult<Option<i64>> {
        Ok(self.cards.get_card(card_number).await?.map(|card| card.balance))
    }

    // =========================================================================
    // Money
    // =========================================================================

    /// Deposits a non-negative amount.
    ///
    /// ## Errors
    /// * `InvalidAmount` - `amount` is negative, or the balance would
    ///   overflow
    /// * `CardNotFound` - No such card
    pub async fn add_income(&self, card_number: &str, amount: i64) -> ServiceResult<()> {
        validate_income_amount(amount).map_err(|e| ServiceError::invalid_amount(amount, e))?;

        let card = self
            .cards
            .get_card(card_number)
            .await?
            .ok_or_else(|| ServiceError::CardNotFound(card_number.to_string()))?;
        card.balance
            .checked_add(amount)
            .ok_or_else(|| ServiceError::balance_overflow(amount))?;

        self.cards.update_balance(card_number, amount).await?;

        info!(number = %card_number, amount, "Income added");
        Ok(())
    }

    /// Checks that `dest` can receive a transfer from `origin`.
    ///
    /// ## Errors
    /// * `SameAccount` - `dest` equals `origin`
    /// * `InvalidCardNumber` - `dest` fails the Luhn check
    /// * `CardNotFound` - `dest` is not stored
    pub async fn check_transfer_target(&self, origin: &str, dest: &str) -> ServiceResult<()> {
        if origin == dest {
            return Err(ServiceError::SameAccount);
        }

        if !luhn::is_valid(dest) {
            return Err(ServiceError::InvalidCardNumber(dest.to_string()));
        }

        if !self.cards.card_exists(dest).await? {
            return Err(ServiceError::CardNotFound(dest.to_string()));
        }

        Ok(())
    }

    /// Moves `amount` from `origin` to `dest`.
    ///
    /// ## Errors
    /// * `InvalidAmount` - `amount` is not positive
    /// * `SameAccount` / `InvalidCardNumber` / `CardNotFound` - see
    ///   [`check_transfer_target`](Self::check_transfer_target)
    /// * `CardNotFound` - `origin` is not stored
    /// * `InsufficientFunds` - `origin` balance is below `amount`
    /// * `InvalidAmount` - `dest` balance would overflow
    pub async fn transfer_money(&self, origin: &str, dest: &str, amount: i64) -> ServiceResult<()> {
        validate_transfer_amount(amount).map_err(|e| ServiceError::invalid_amount(amount, e))?;

        self.check_transfer_target(origin, dest).await?;

        let origin_card = self
            .cards
            .get_card(origin)
            .await?
            .ok_or_else(|| ServiceError::CardNotFound(origin.to_string()))?;

        if !origin_card.can_cover(amount) {
            return Err(ServiceError::InsufficientFunds {
                available: origin_card.balance,
                requested: amount,
            });
        }

        let dest_card = self
            .cards
            .get_card(dest)
            .await?
            .ok_or_else(|| ServiceError::CardNotFound(dest.to_string()))?;
        dest_card
            .balance
            .checked_add(amount)
            .ok_or_else(|| ServiceError::balance_overflow(amount))?;

        self.cards.transfer(origin, dest, amount).await?;

        info!(origin = %origin, dest = %dest, amount, "Transfer completed");
        Ok(())
    }

    /// Closes the account behind a card.
    pub async fn delete_account(&self, card_number: &str) -> ServiceResult<()> {
        self.cards.delete_account(card_number).await?;

        info!(number = %card_number, "Account closed");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issuer::tests::ScriptedSource;
    use bank_db::DbConfig;

    const CARD_A: &str = "4000004938320896";
    const CARD_B: &str = "4000008449433403";

    async fn service() -> BankService {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        BankService::with_number_source(
            db,
            ServiceConfig::default(),
            Box::new(RandomNumberSource::seeded(11)),
        )
    }

    /// Service with two scripted cards: A (PIN 1234) and B (PIN 1234).
    async fn two_cards() -> BankService {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let bank = BankService::with_number_source(
            db,
            ServiceConfig::default(),
            Box::new(ScriptedSource::new(&[493832089, 844943340], 1234)),
        );
        assert_eq!(bank.create_account().await.unwrap(), CARD_A);
        assert_eq!(bank.create_account().await.unwrap(), CARD_B);
        bank
    }

    async fn balance(bank: &BankService, number: &str) -> i64 {
        bank.get_balance(number).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn test_create_account_scenario() {
        let bank = service().await;

        let number = bank.create_account().await.unwrap();

        assert_eq!(number.len(), 16);
        assert!(number.bytes().all(|b| b.is_ascii_digit()));
        assert!(bank.is_valid_card_number(&number));
        assert!(bank.card_present(&number).await.unwrap());
        assert_eq!(bank.get_balance(&number).await.unwrap(), Some(0));

        let pin = bank.get_pin(&number).await.unwrap().unwrap();
        assert_eq!(pin.len(), 4);
        assert!(bank.check_pin(&number, &pin).await.unwrap());
    }

    #[tokio::test]
    async fn test_create_account_never_repeats() {
        let bank = service().await;

        let mut seen = std::collections::HashSet::new();
        for _ in 0..30 {
            assert!(seen.insert(bank.create_account().await.unwrap()));
        }
    }

    #[tokio::test]
    async fn test_wrong_pin_is_false_and_changes_nothing() {
        let bank = two_cards().await;
        bank.add_income(CARD_A, 40).await.unwrap();

        assert!(!bank.check_pin(CARD_A, "0000").await.unwrap());
        assert!(!bank.check_pin(CARD_A, "").await.unwrap());
        assert!(!bank.check_pin("4000001234567899", "1234").await.unwrap());
        assert!(!bank.check_pin(CARD_A, "12345").await.unwrap());
        assert!(!bank.check_pin("4000 0049", "1234").await.unwrap());

        assert_eq!(balance(&bank, CARD_A).await, 40);
        assert_eq!(bank.get_pin(CARD_A).await.unwrap().as_deref(), Some("1234"));
        assert_eq!(bank.database().cards().count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_unknown_card_is_absent() {
        let bank = service().await;

        assert!(!bank.card_present(CARD_A).await.unwrap());
        assert_eq!(bank.get_pin(CARD_A).await.unwrap(), None);
        assert_eq!(bank.get_balance(CARD_A).await.unwrap(), None);
        assert!(bank.get_card(CARD_A).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_add_income_scenario() {
        let bank = two_cards().await;

        bank.add_income(CARD_A, 500).await.unwrap();
        assert_eq!(balance(&bank, CARD_A).await, 500);

        bank.add_income(CARD_A, 0).await.unwrap();
        assert_eq!(balance(&bank, CARD_A).await, 500);
    }

    #[tokio::test]
    async fn test_add_income_rejections() {
        let bank = two_cards().await;

        assert!(matches!(
            bank.add_income(CARD_A, -10).await,
            Err(ServiceError::InvalidAmount { amount: -10, .. })
        ));
        assert!(matches!(
            bank.add_income("4000001234567899", 10).await,
            Err(ServiceError::CardNotFound(_))
        ));
        assert_eq!(balance(&bank, CARD_A).await, 0);
    }

    #[tokio::test]
    async fn test_income_past_the_limit_is_refused() {
        let bank = two_cards().await;
        bank.add_income(CARD_A, i64::MAX).await.unwrap();

        assert!(matches!(
            bank.add_income(CARD_A, 1).await,
            Err(ServiceError::InvalidAmount { amount: 1, .. })
        ));

        assert_eq!(bank.get_balance(CARD_A).await.unwrap(), Some(i64::MAX));
        assert!(bank.check_pin(CARD_A, "1234").await.unwrap());
    }

    #[tokio::test]
    async fn test_transfer_credit_past_the_limit_is_refused() {
        let bank = two_cards().await;
        bank.add_income(CARD_A, i64::MAX).await.unwrap();
        bank.add_income(CARD_B, 50).await.unwrap();

        assert!(matches!(
            bank.transfer_money(CARD_B, CARD_A, 50).await,
            Err(ServiceError::InvalidAmount { amount: 50, .. })
        ));

        assert_eq!(balance(&bank, CARD_A).await, i64::MAX);
        assert_eq!(balance(&bank, CARD_B).await, 50);
        bank.transfer_money(CARD_A, CARD_B, 1).await.unwrap();
        assert_eq!(balance(&bank, CARD_B).await, 51);
    }

    #[tokio::test]
    async fn test_transfer_scenario() {
        let bank = two_cards().await;
        bank.add_income(CARD_A, 500).await.unwrap();
        let before_b = balance(&bank, CARD_B).await;

        bank.transfer_money(CARD_A, CARD_B, 200).await.unwrap();

        assert_eq!(balance(&bank, CARD_A).await, 300);
        assert_eq!(balance(&bank, CARD_B).await, before_b + 200);
    }

    #[tokio::test]
    async fn test_transfer_whole_balance() {
        let bank = two_cards().await;
        bank.add_income(CARD_A, 500).await.unwrap();

        bank.transfer_money(CARD_A, CARD_B, 500).await.unwrap();

        assert_eq!(balance(&bank, CARD_A).await, 0);
        assert_eq!(balance(&bank, CARD_B).await, 500);
    }

    #[tokio::test]
    async fn test_transfer_insufficient_funds() {
        let bank = two_cards().await;
        bank.add_income(CARD_A, 100).await.unwrap();

        let err = bank.transfer_money(CARD_A, CARD_B, 101).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::InsufficientFunds {
                available: 100,
                requested: 101
            }
        ));
        assert_eq!(balance(&bank, CARD_A).await, 100);
        assert_eq!(balance(&bank, CARD_B).await, 0);
    }

    #[tokio::test]
    async fn test_transfer_target_checks() {
        let bank = two_cards().await;
        bank.add_income(CARD_A, 100).await.unwrap();

        assert!(matches!(
            bank.transfer_money(CARD_A, CARD_A, 10).await,
            Err(ServiceError::SameAccount)
        ));
        assert!(matches!(
            bank.transfer_money(CARD_A, "4000008449433404", 10).await,
            Err(ServiceError::InvalidCardNumber(_))
        ));
        assert!(matches!(
            bank.transfer_money(CARD_A, "4000001234567899", 10).await,
            Err(ServiceError::CardNotFound(_))
        ));
        assert!(bank.check_transfer_target(CARD_A, CARD_B).await.is_ok());

        assert_eq!(balance(&bank, CARD_A).await, 100);
    }

    #[tokio::test]
    async fn test_transfer_amount_checks() {
        let bank = two_cards().await;
        bank.add_income(CARD_A, 100).await.unwrap();

        assert!(matches!(
            bank.transfer_money(CARD_A, CARD_B, 0).await,
            Err(ServiceError::InvalidAmount { amount: 0, .. })
        ));
        assert!(matches!(
            bank.transfer_money(CARD_A, CARD_B, -50).await,
            Err(ServiceError::InvalidAmount { amount: -50, .. })
        ));
        assert_eq!(balance(&bank, CARD_B).await, 0);
    }

    #[tokio::test]
    async fn test_transfer_from_unknown_origin() {
        let bank = two_cards().await;

        assert!(matches!(
            bank.transfer_money("4000001234567899", CARD_B, 10).await,
            Err(ServiceError::CardNotFound(ref n)) if n == "4000001234567899"
        ));
    }

    #[tokio::test]
    async fn test_delete_account_scenario() {
        let bank = two_cards().await;

        bank.delete_account(CARD_A).await.unwrap();

        assert!(bank.get_card(CARD_A).await.unwrap().is_none());
        assert!(bank.get_card_by_account("493832089").await.unwrap().is_none());
        assert!(!bank.check_pin(CARD_A, "1234").await.unwrap());
        assert!(matches!(
            bank.delete_account(CARD_A).await,
            Err(ServiceError::CardNotFound(_))
        ));
        assert!(bank.card_present(CARD_B).await.unwrap());
    }

    #[tokio::test]
    async fn test_get_card_by_account() {
        let bank = two_cards().await;

        let card = bank.get_card_by_account("844943340").await.unwrap().unwrap();
        assert_eq!(card.number, CARD_B);
        assert!(bank.get_card_by_account("84494334").await.unwrap().is_none());
        assert!(bank.get_card_by_account("abc").await.unwrap().is_none());
    }
}
