//! # Card Issuer
//!
//! Issues new cards whose card number and account number are not yet taken.
//!
//! ## Issuance Workflow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   ┌──► draw account number ── taken? ──yes──┐                          │
//! │   │          │ no                           │                          │
//! │   │          ▼                              │                          │
//! │   │    bank id + account + check digit      │                          │
//! │   │          │                              │                          │
//! │   │          ▼                              │                          │
//! │   │    card number taken? ──────yes─────────┤                          │
//! │   │          │ no                           │                          │
//! │   │          ▼                              │                          │
//! │   │    draw PIN, insert card + account      │                          │
//! │   │          │                              │                          │
//! │   │     ok ◄─┴─► insert failed ─────────────┤                          │
//! │   │     │                                   ▼                          │
//! │   │     ▼                         attempts left? ──no──► Exhausted     │
//! │   │  return card                            │ yes                      │
//! │   └─────────────────────────────────────────┘                          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every account-number draw spends one attempt. Lookup failures are
//! returned as they are; only collisions and failed inserts are retried.

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use bank_core::generator::{self, format_pin};
use bank_core::{Card, NumberSource};
use bank_db::CardRepository;

use crate::config::ServiceConfig;
use crate::error::{ServiceError, ServiceResult};

/// Issues cards with unique numbers.
pub struct CardIssuer {
    cards: CardRepository,
    bank_id: String,
    max_attempts: u32,
    source: Mutex<Box<dyn NumberSource>>,
}

impl CardIssuer {
    /// Creates an issuer drawing numbers from `source`.
    pub fn new(cards: CardRepository, config: &ServiceConfig, source: Box<dyn NumberSource>) -> Self {
        CardIssuer {
            cards,
            bank_id: config.bank_id.clone(),
            max_attempts: config.max_issue_attempts,
            source: Mutex::new(source),
        }
    }

    /// Issues a new card with balance 0.
    ///
    /// ## Returns
    /// * `Ok(Card)` - Stored card, including its PIN
    /// * `Err(ServiceError::GenerationExhausted)` - Attempt budget spent
    /// * `Err(ServiceError::Store)` - A lookup failed
    /// * `Err(ServiceError::Core)` - The configured bank id is not numeric
    pub async fn issue(&self) -> ServiceResult<Card> {
        for attempt in 1..=self.max_attempts {
            let account_number = self.source.lock().await.account_number();
            let account = account_number.to_string();

            if self.cards.get_account(&account).await?.is_some() {
                debug!(attempt, account = %account, "Account number taken, redrawing");
                continue;
            }

            let card_number = generator::card_number(&self.bank_id, account_number)?;

            if self.cards.card_exists(&card_number).await? {
                debug!(attempt, number = %card_number, "Card number taken, restarting");
                continue;
            }

            let pin = format_pin(self.source.lock().await.pin());

            match self
                .cards
                .create_card_and_account(&card_number, &pin, &account)
                .await
            {
                Ok(card) => {
                    info!(id = card.id, number = %card.number, attempt, "Card issued");
                    return Ok(card);
                }
                Err(e) => {
                    warn!(attempt, number = %card_number, error = %e, "Card insert failed, restarting");
                }
            }
        }

        warn!(attempts = self.max_attempts, "Card issuance exhausted its attempts");
        Err(ServiceError::GenerationExhausted {
            attempts: self.max_attempts,
        })
    }
}

impl std::fmt::Debug for CardIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardIssuer")
            .field("bank_id", &self.bank_id)
            .field("max_attempts", &self.max_attempts)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
