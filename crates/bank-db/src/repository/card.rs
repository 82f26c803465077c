//! # Card Repository
//!
//! Database operations for cards, their accounts and balances.
//!
//! ## Transaction Boundaries
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Writes and Their Transactions                        │
//! │                                                                         │
//! │  create_card_and_account                                               │
//! │  └── BEGIN → bump id_sequence → INSERT card → INSERT account → COMMIT  │
//! │                                                                         │
//! │  update_balance                                                        │
//! │  └── BEGIN → check card → UPDATE balance += delta → COMMIT             │
//! │                                                                         │
//! │  transfer                                                              │
//! │  └── BEGIN → check both cards → debit origin → credit dest → COMMIT    │
//! │                                                                         │
//! │  delete_account                                                        │
//! │  └── BEGIN → find card id → DELETE card → DELETE account → COMMIT      │
//! │                                                                         │
//! │  Any `?` before COMMIT drops the transaction, which rolls it back.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Uniqueness
//! The schema does not declare `card.number` or `account.account` unique, so
//! the checks live here. Reads that find two rows for one key report
//! `DbError::Consistency` instead of picking one.

use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::{debug, error, warn};

use crate::error::{DbError, DbResult};
use bank_core::{Account, Card};

const SELECT_CARD_BY_NUMBER: &str = r#"
    SELECT id, number, pin, COALESCE(balance, 0) AS balance
    FROM card
    WHERE number = ?1
    LIMIT 2
"#;

const SELECT_CARD_BY_ID: &str = r#"
    SELECT id, number, pin, COALESCE(balance, 0) AS balance
    FROM card
    WHERE id = ?1
"#;

const SELECT_ACCOUNT_BY_NUMBER: &str = r#"
    SELECT id, account
    FROM account
    WHERE account = ?1
    LIMIT 2
"#;

/// Repository for card and account operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.cards();
///
/// let card = repo.create_card_and_account("4000004938320896", "1234", "493832089").await?;
/// repo.update_balance(&card.number, 500).await?;
/// ```
#[derive(Debug, Clone)]
pub struct CardRepository {
    pool: SqlitePool,
}

impl CardRepository {
    /// Creates a new CardRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CardRepository { pool }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Checks whether a card with this number exists.
    ///
    /// ## Returns
    /// * `Ok(true)` / `Ok(false)` - Exactly one / no matching row
    /// * `Err(DbError::Consistency)` - More than one matching row
    pub async fn card_exists(&self, number: &str) -> DbResult<bool> {
        let rows = count_cards(&self.pool, number).await?;
        exists_from_count(number, rows)
    }

    /// Returns the id the next created card will receive.
    ///
    /// The sequence never moves backwards, so ids of deleted cards are
    /// not handed out again.
    pub async fn next_surrogate_id(&self) -> DbResult<i64> {
        let next: i64 = sqlx::query_scalar(
            r#"
            SELECT MAX(
                COALESCE((SELECT value FROM id_sequence WHERE name = 'card'), 0),
                COALESCE((SELECT MAX(id) FROM card), 0)
            ) + 1
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(next)
    }

    /// Gets a card by its number.
    ///
    /// ## Returns
    /// * `Ok(Some(Card))` - Card found
    /// * `Ok(None)` - Card not found
    /// * `Err(DbError::Consistency)` - More than one card with this number
    pub async fn get_card(&self, number: &str) -> DbResult<Option<Card>> {
        let mut cards: Vec<Card> = sqlx::query_as(SELECT_CARD_BY_NUMBER)
            .bind(number)
            .fetch_all(&self.pool)
            .await?;

        if cards.len() > 1 {
            error!(number = %number, rows = cards.len(), "Duplicate card rows");
            return Err(DbError::consistency("card", number, cards.len()));
        }

        Ok(cards.pop())
    }

    /// Gets an account by its account number.
    pub async fn get_account(&self, account_number: &str) -> DbResult<Option<Account>> {
        let mut accounts: Vec<Account> = sqlx::query_as(SELECT_ACCOUNT_BY_NUMBER)
            .bind(account_number)
            .fetch_all(&self.pool)
            .await?;

        if accounts.len() > 1 {
            error!(account = %account_number, rows = accounts.len(), "Duplicate account rows");
            return Err(DbError::consistency("account", account_number, accounts.len()));
        }

        Ok(accounts.pop())
    }

    /// Gets the card linked to an account number.
    ///
    /// Two lookups on one connection: account → id → card. An account whose
    /// card row is missing yields `None`.
    pub async fn get_card_by_account(&self, account_number: &str) -> DbResult<Option<Card>> {
        let mut conn = self.pool.acquire().await?;

        let accounts: Vec<Account> = sqlx::query_as(SELECT_ACCOUNT_BY_NUMBER)
            .bind(account_number)
            .fetch_all(&mut *conn)
            .await?;

        let account = match accounts.as_slice() {
            [] => return Ok(None),
            [account] => account,
            _ => {
                error!(account = %account_number, rows = accounts.len(), "Duplicate account rows");
                return Err(DbError::consistency("account", account_number, accounts.len()));
            }
        };

        let card: Option<Card> = sqlx::query_as(SELECT_CARD_BY_ID)
            .bind(account.id)
            .fetch_optional(&mut *conn)
            .await?;

        if card.is_none() {
            warn!(account = %account_number, id = account.id, "Account has no card row");
        }

        Ok(card)
    }

    /// Counts card rows (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM card")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Inserts a card (balance 0) and its account in one transaction.
    ///
    /// ## Returns
    /// * `Ok(Card)` - The stored card with its new id
    /// * `Err(DbError::UniqueViolation)` - Card or account number already taken
    ///
    /// Nothing is written unless both rows are.
    pub async fn create_card_and_account(
        &self,
        card_number: &str,
        pin: &str,
        account_number: &str,
    ) -> DbResult<Card> {
        debug!(number = %card_number, account = %account_number, "Creating card");

        let mut tx = self.pool.begin().await?;

        if count_cards(&mut *tx, card_number).await? > 0 {
            return Err(DbError::duplicate("card number", card_number));
        }

        let accounts: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM account WHERE account = ?1")
            .bind(account_number)
            .fetch_one(&mut *tx)
            .await?;
        if accounts > 0 {
            return Err(DbError::duplicate("account number", account_number));
        }

        let id = next_id(&mut tx).await?;

        sqlx::query("INSERT INTO card (id, number, pin, balance) VALUES (?1, ?2, ?3, 0)")
            .bind(id)
            .bind(card_number)
            .bind(pin)
            .execute(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO account (id, account) VALUES (?1, ?2)")
            .bind(id)
            .bind(account_number)
            .execute(&mut *tx)
            .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        debug!(id = id, number = %card_number, "Card created");

        Ok(Card {
            id,
            number: card_number.to_string(),
            pin: pin.to_string(),
            balance: 0,
        })
    }

    /// Adds `delta` to a card's balance.
    ///
    /// ## Returns
    /// * `Ok(())` - Balance updated
    /// * `Err(DbError::NotFound)` - No such card; nothing was written
    pub async fn update_balance(&self, card_number: &str, delta: i64) -> DbResult<()> {
        debug!(number = %card_number, delta = delta, "Updating balance");

        let mut tx = self.pool.begin().await?;

        require_card(&mut *tx, card_number).await?;
        apply_delta(&mut tx, card_number, delta).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(())
    }

    /// Moves `amount` from `origin` to `dest` in one transaction.
    ///
    /// Both cards are checked inside the transaction before either balance
    /// changes. The origin is not checked for sufficient funds here.
    ///
    /// ## Returns
    /// * `Err(DbError::InvalidAmount)` - `amount` is not positive
    /// * `Err(DbError::NotFound)` - Either card is missing; nothing was written
    pub async fn transfer(&self, origin: &str, dest: &str, amount: i64) -> DbResult<()> {
        if amount <= 0 {
            return Err(DbError::InvalidAmount(amount));
        }

        debug!(origin = %origin, dest = %dest, amount = amount, "Transferring");

        let mut tx = self.pool.begin().await?;

        require_card(&mut *tx, origin).await?;
        require_card(&mut *tx, dest).await?;

        apply_delta(&mut tx, origin, -amount).await?;
        apply_delta(&mut tx, dest, amount).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(())
    }

    /// Removes a card and its linked account in one transaction.
    ///
    /// ## Returns
    /// * `Ok(())` - Both rows removed
    /// * `Err(DbError::NotFound)` - No such card
    pub async fn delete_account(&self, card_number: &str) -> DbResult<()> {
        debug!(number = %card_number, "Deleting account");

        let mut tx = self.pool.begin().await?;

        let ids: Vec<i64> = sqlx::query_scalar("SELECT id FROM card WHERE number = ?1 LIMIT 2")
            .bind(card_number)
            .fetch_all(&mut *tx)
            .await?;

        let id = match ids.as_slice() {
            [] => return Err(DbError::not_found("Card", card_number)),
            [id] => *id,
            _ => {
                error!(number = %card_number, rows = ids.len(), "Duplicate card rows");
                return Err(DbError::consistency("card", card_number, ids.len()));
            }
        };

        sqlx::query("DELETE FROM card WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let accounts = sqlx::query("DELETE FROM account WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if accounts.rows_affected() == 0 {
            warn!(number = %card_number, id = id, "Card had no account row");
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(())
    }
}

// =============================================================================
// Helpers
// =============================================================================
// These take any executor so the same SQL runs on the pool or inside an
// open transaction.

async fn count_cards<'e, E>(executor: E, number: &str) -> DbResult<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM card WHERE number = ?1")
        .bind(number)
        .fetch_one(executor)
        .await?;

    Ok(count)
}

fn exists_from_count(number: &str, rows: i64) -> DbResult<bool> {
    match rows {
        0 => Ok(false),
        1 => Ok(true),
        n => {
            error!(number = %number, rows = n, "Duplicate card rows");
            Err(DbError::consistency("card", number, n as usize))
        }
    }
}

async fn require_card<'e, E>(executor: E, number: &str) -> DbResult<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = count_cards(executor, number).await?;
    if exists_from_count(number, rows)? {
        Ok(())
    } else {
        Err(DbError::not_found("Card", number))
    }
}

/// Adds `delta` to a card's balance without leaving the i64 range.
async fn apply_delta(
    tx: &mut sqlx::Transaction<'_, Sqlite>,
    number: &str,
    delta: i64,
) -> DbResult<()> {
    let balance: Option<i64> =
        sqlx::query_scalar("SELECT COALESCE(balance, 0) FROM card WHERE number = ?1")
            .bind(number)
            .fetch_optional(&mut **tx)
            .await?;

    let balance = balance.ok_or_else(|| DbError::not_found("Card", number))?;

    let updated = balance.checked_add(delta).ok_or_else(|| {
        warn!(number = %number, balance, delta, "Balance would leave the integer range");
        DbError::BalanceOverflow {
            number: number.to_string(),
            delta,
        }
    })?;

    let result = sqlx::query("UPDATE card SET balance = ?1 WHERE number = ?2")
        .bind(updated)
        .bind(number)
        .execute(&mut **tx)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Card", number));
    }

    Ok(())
}

/// Advances the card id sequence and returns the new value.
async fn next_id(tx: &mut sqlx::Transaction<'_, Sqlite>) -> DbResult<i64> {
    let bumped: Option<i64> = sqlx::query_scalar(
        r#"
        UPDATE id_sequence
        SET value = MAX(value, (SELECT COALESCE(MAX(id), 0) FROM card)) + 1
        WHERE name = 'card'
        RETURNING value
        "#,
    )
    .fetch_optional(&mut **tx)
    .await?;

    if let Some(id) = bumped {
        return Ok(id);
    }

    // Sequence row missing (removed by hand): recreate it past every card.
    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO id_sequence (name, value)
        SELECT 'card', COALESCE(MAX(id), 0) + 1 FROM card
        RETURNING value
        "#,
    )
    .fetch_one(&mut **tx)
    .await?;

    Ok(id)
}

// =============================================================================
// Unit Tests
// =============================================================================
