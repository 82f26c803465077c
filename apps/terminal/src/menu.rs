//! # Text Menu
//!
//! The interactive loop over any reader/writer pair.
//!
//! ## Menu Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Create an account ──► print number + PIN ──────────────┐            │
//! │  2. Log into account  ──► card number, PIN ── wrong ───────┤            │
//! │  0. Exit ──► Bye!               │ ok                        │            │
//! │                                 ▼                           │            │
//! │        ┌──────────────────────────────────────────┐         │            │
//! │        │ 1. Balance        4. Close account ──────┼─────────┤            │
//! │        │ 2. Add income     5. Log out ────────────┼─────────┘            │
//! │        │ 3. Do transfer    0. Exit ──► Bye!       │                      │
//! │        └──────────────────────────────────────────┘                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! End of input behaves like `0`. Blank lines are skipped and non-numeric
//! answers to numeric prompts are asked again.

use std::fmt::Display;
use std::io::{BufRead, Write};
use std::str::FromStr;

use tracing::{debug, error, warn};

use bank_service::{BankService, ServiceError};

use crate::error::AppResult;

const MAIN_MENU: &[&str] = &["1. Create an account", "2. Log into account", "0. Exit"];

const ACCOUNT_MENU: &[&str] = &[
    "1. Balance",
    "2. Add income",
    "3. Do transfer",
    "4. Close account",
    "5. Log out",
    "0. Exit",
];

const BAD_AMOUNT: &str = "Incorrect input amount";
const NO_SUCH_CARD: &str = "Such a card does not exist.";

/// Where the account menu goes next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Stay,
    LoggedOut,
    Exit,
}

/// Interactive session over a bank.
pub struct Terminal<'a, R, W> {
    bank: &'a BankService,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> Terminal<'a, R, W> {
    pub fn new(bank: &'a BankService, input: R, output: W) -> Self {
        Terminal {
            bank,
            input,
            output,
        }
    }

    /// Runs the main menu until exit or end of input.
    pub async fn run(&mut self) -> AppResult<()> {
        loop {
            self.show(MAIN_MENU)?;

            let Some(option) = self.read_option(MAIN_MENU.len() - 1)? else {
                return self.bye();
            };

            match option {
                0 => return self.bye(),
                1 => self.create_account().await?,
                2 => {
                    if self.log_in().await? == Flow::Exit {
                        return self.bye();
                    }
                }
                _ => self.say("Invalid Option")?,
            }
        }
    }

    // =========================================================================
    // Main menu
    // =========================================================================

    async fn create_account(&mut self) -> AppResult<()> {
        let issued = match self.bank.create_account().await {
            Ok(number) => self.bank.get_pin(&number).await.map(|pin| (number, pin)),
            Err(e) => Err(e),
        };

        match issued {
            Ok((number, Some(pin))) => {
                self.say("Your card has been created")?;
                self.say("Your card number:")?;
                self.say(&number)?;
                self.say("Your card PIN:")?;
                self.say(&pin)
            }
            Ok((number, None)) => {
                error!(number = %number, "Issued card not readable");
                self.say("failed to create new account")
            }
            Err(e) => {
                error!(error = %e, "Card issuance failed");
                self.say("failed to create new account")
            }
        }
    }

    async fn log_in(&mut self) -> AppResult<Flow> {
        self.say("Enter your card number:")?;
        let Some(card_number) = self.read_line()? else {
            return Ok(Flow::Exit);
        };

        self.say("Enter your PIN:")?;
        let Some(pin) = self.read_line()? else {
            return Ok(Flow::Exit);
        };

        match self.bank.check_pin(&card_number, &pin).await {
            Ok(true) => {
                self.say("You have successfully logged in!")?;
                self.account_menu(&card_number).await
            }
            Ok(false) => {
                self.say("Wrong card number or PIN!")?;
                Ok(Flow::LoggedOut)
            }
            Err(e) => {
                error!(error = %e, "PIN check failed");
                self.say("Wrong card number or PIN!")?;
                Ok(Flow::LoggedOut)
            }
        }
    }

    // =========================================================================
    // Account menu
    // =========================================================================

    async fn account_menu(&mut self, card_number: &str) -> AppResult<Flow> {
        loop {
            self.show(ACCOUNT_MENU)?;

            let Some(option) = self.read_option(ACCOUNT_MENU.len() - 1)? else {
                return Ok(Flow::Exit);
            };

            let flow = match option {
                0 => Flow::Exit,
                1 => self.balance(card_number).await?,
                2 => self.add_income(card_number).await?,
                3 => self.transfer(card_number).await?,
                4 => self.close_account(card_number).await?,
                5 => {
                    self.say("You have successfully logged out!")?;
                    Flow::LoggedOut
                }
                _ => {
                    self.say("Invalid Option")?;
                    Flow::Stay
                }
            };

            if flow != Flow::Stay {
                return Ok(flow);
            }
        }
    }

    async fn balance(&mut self, card_number: &str) -> AppResult<Flow> {
        match self.bank.get_balance(card_number).await {
            Ok(Some(balance)) => {
                self.say(format!("Balance: {balance}"))?;
                Ok(Flow::Stay)
            }
            Ok(None) => {
                self.say(NO_SUCH_CARD)?;
                Ok(Flow::LoggedOut)
            }
            Err(e) => self.failed(e),
        }
    }

    async fn add_income(&mut self, card_number: &str) -> AppResult<Flow> {
        self.say("Enter income:")?;
        let Some(amount) = self.read_number::<i64>(BAD_AMOUNT)? else {
            return Ok(Flow::Exit);
        };

        match self.bank.add_income(card_number, amount).await {
            Ok(()) => {
                self.say("Income was added!")?;
                Ok(Flow::Stay)
            }
            Err(ServiceError::InvalidAmount { .. }) => {
                self.say(BAD_AMOUNT)?;
                Ok(Flow::Stay)
            }
            Err(ServiceError::CardNotFound(_)) => {
                self.say(NO_SUCH_CARD)?;
                Ok(Flow::LoggedOut)
            }
            Err(e) => self.failed(e),
        }
    }

    async fn transfer(&mut self, card_number: &str) -> AppResult<Flow> {
        self.say("Transfer")?;
        self.say("Enter card number:")?;
        let Some(dest) = self.read_line()? else {
            return Ok(Flow::Exit);
        };

        if let Err(e) = self.bank.check_transfer_target(card_number, &dest).await {
            return self.refused_transfer(e);
        }

        self.say("Enter how much money you want to transfer:")?;
        let Some(amount) = self.read_number::<i64>(BAD_AMOUNT)? else {
            return Ok(Flow::Exit);
        };

        match self.bank.transfer_money(card_number, &dest, amount).await {
            Ok(()) => {
                self.say("Success!")?;
                Ok(Flow::Stay)
            }
            Err(e) => self.refused_transfer(e),
        }
    }

    fn refused_transfer(&mut self, err: ServiceError) -> AppResult<Flow> {
        debug!(error = %err, "Transfer refused");
        let message = match err {
            ServiceError::SameAccount => "You can't transfer money to the same account!",
            ServiceError::InvalidCardNumber(_) => {
                "Probably you made a mistake in the card number. Please try again!"
            }
            ServiceError::CardNotFound(_) => NO_SUCH_CARD,
            ServiceError::InsufficientFunds { .. } => "Not enough money!",
            ServiceError::InvalidAmount { .. } => BAD_AMOUNT,
            other => return self.failed(other),
        };
        self.say(message)?;
        Ok(Flow::Stay)
    }

    async fn close_account(&mut self, card_number: &str) -> AppResult<Flow> {
        match self.bank.delete_account(card_number).await {
            Ok(()) => {
                self.say("The account has been closed!")?;
                Ok(Flow::LoggedOut)
            }
            Err(ServiceError::CardNotFound(_)) => {
                self.say(NO_SUCH_CARD)?;
                Ok(Flow::LoggedOut)
            }
            Err(e) => self.failed(e),
        }
    }

    // =========================================================================
    // I/O helpers
    // =========================================================================

    fn failed(&mut self, err: ServiceError) -> AppResult<Flow> {
        match &err {
            ServiceError::Store(e) if e.is_store_failure() => {
                error!(error = %err, "Store unavailable");
            }
            _ => warn!(error = %err, "Operation failed"),
        }
        self.say("Operation failed, please try again.")?;
        Ok(Flow::Stay)
    }

    fn bye(&mut self) -> AppResult<()> {
        self.say("Bye!")
    }

    fn show(&mut self, options: &[&str]) -> AppResult<()> {
        for option in options {
            self.say(option)?;
        }
        Ok(())
    }

    fn say(&mut self, line: impl Display) -> AppResult<()> {
        writeln!(self.output, "{line}")?;
        self.output.flush()?;
        Ok(())
    }

    /// Next non-blank line, trimmed. `None` at end of input.
    fn read_line(&mut self) -> AppResult<Option<String>> {
        loop {
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(None);
            }

            let line = line.trim();
            if !line.is_empty() {
                return Ok(Some(line.to_string()));
            }
        }
    }

    fn read_number<T: FromStr>(&mut self, retry: &str) -> AppResult<Option<T>> {
        loop {
            let Some(line) = self.read_line()? else {
                return Ok(None);
            };

            match line.parse() {
                Ok(value) => return Ok(Some(value)),
                Err(_) => self.say(retry)?,
            }
        }
    }

    fn read_option(&mut self, highest: usize) -> AppResult<Option<i64>> {
        let retry = format!("incorrect input, expected a number from 0 to {highest}");
        self.read_number(&retry)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use bank_core::RandomNumberSource;
    use bank_db::{Database, DbConfig};
    use bank_service::ServiceConfig;

    const UNKNOWN_CARD: &str = "4000001234567899";
    const BAD_CHECKSUM: &str = "4000001234567890";

    async fn bank() -> BankService {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        BankService::with_number_source(
            db,
            ServiceConfig::default(),
            Box::new(RandomNumberSource::seeded(7)),
        )
    }

    /// Issues a card directly and returns (number, PIN).
    async fn card(bank: &BankService) -> (String, String) {
        let number = bank.create_account().await.unwrap();
        let pin = bank.get_pin(&number).await.unwrap().unwrap();
        (number, pin)
    }

    async fn session(bank: &BankService, input: &str) -> String {
        let mut output = Vec::new();
        Terminal::new(bank, input.as_bytes(), &mut output)
            .run()
            .await
            .unwrap();
        String::from_utf8(output).unwrap()
    }

    #[tokio::test]
    async fn test_exit_and_end_of_input() {
        let bank = bank().await;

        let out = session(&bank, "0\n").await;
        assert_eq!(out, "1. Create an account\n2. Log into account\n0. Exit\nBye!\n");

        let out = session(&bank, "").await;
        assert!(out.ends_with("Bye!\n"));
    }

    #[tokio::test]
    async fn test_create_account_prints_card() {
        let bank = bank().await;

        let out = session(&bank, "1\n0\n").await;

        let lines: Vec<&str> = out.lines().collect();
        let at = lines
            .iter()
            .position(|l| *l == "Your card has been created")
            .unwrap();
        assert_eq!(lines[at + 1], "Your card number:");
        let number = lines[at + 2];
        assert_eq!(lines[at + 3], "Your card PIN:");
        let pin = lines[at + 4];

        assert_eq!(number.len(), 16);
        assert_eq!(pin.len(), 4);
        assert!(bank.check_pin(number, pin).await.unwrap());
    }

    #[tokio::test]
    async fn test_wrong_pin() {
        let bank = bank().await;
        let (number, pin) = card(&bank).await;
        let wrong = if pin == "0000" { "1111" } else { "0000" };

        let out = session(&bank, &format!("2\n{number}\n{wrong}\n0\n")).await;

        assert!(out.contains("Enter your card number:\nEnter your PIN:\nWrong card number or PIN!\n"));
        assert!(!out.contains("You have successfully logged in!"));
        assert!(out.ends_with("Bye!\n"));
    }

    #[tokio::test]
    async fn test_unknown_card_login() {
        let bank = bank().await;

        let out = session(&bank, &format!("2\n{UNKNOWN_CARD}\n1234\n0\n")).await;
        assert!(out.contains("Wrong card number or PIN!"));
    }

    #[tokio::test]
    async fn test_income_transfer_session() {
        let bank = bank().await;
        let (a, pin) = card(&bank).await;
        let (b, _) = card(&bank).await;

        let input = format!("2\n{a}\n{pin}\n2\n500\n1\n3\n{b}\n200\n1\n5\n0\n");
        let out = session(&bank, &input).await;

        assert!(out.contains("You have successfully logged in!"));
        assert!(out.contains("Enter income:\nIncome was added!\n"));
        assert!(out.contains("Balance: 500\n"));
        assert!(out.contains(
            "Transfer\nEnter card number:\nEnter how much money you want to transfer:\nSuccess!\n"
        ));
        assert!(out.contains("Balance: 300\n"));
        assert!(out.contains("You have successfully logged out!\n1. Create an account"));
        assert!(out.ends_with("Bye!\n"));

        assert_eq!(bank.get_balance(&a).await.unwrap(), Some(300));
        assert_eq!(bank.get_balance(&b).await.unwrap(), Some(200));
    }

    #[tokio::test]
    async fn test_transfer_refusals() {
        let bank = bank().await;
        let (a, pin) = card(&bank).await;
        let (b, _) = card(&bank).await;
        bank.add_income(&a, 100).await.unwrap();

        let input = format!(
            "2\n{a}\n{pin}\n3\n{a}\n3\n{BAD_CHECKSUM}\n3\n{UNKNOWN_CARD}\n3\n{b}\n101\n0\n"
        );
        let out = session(&bank, &input).await;

        assert!(out.contains("You can't transfer money to the same account!"));
        assert!(out.contains("Probably you made a mistake in the card number. Please try again!"));
        assert!(out.contains("Such a card does not exist."));
        assert!(out.contains("Not enough money!"));
        assert!(!out.contains("Success!"));

        assert_eq!(bank.get_balance(&a).await.unwrap(), Some(100));
        assert_eq!(bank.get_balance(&b).await.unwrap(), Some(0));
    }

    #[tokio::test]
    async fn test_negative_income_refused() {
        let bank = bank().await;
        let (a, pin) = card(&bank).await;

        let out = session(&bank, &format!("2\n{a}\n{pin}\n2\n-5\n0\n")).await;

        assert!(out.contains("Enter income:\nIncorrect input amount\n"));
        assert_eq!(bank.get_balance(&a).await.unwrap(), Some(0));
    }

    #[tokio::test]
    async fn test_income_past_the_limit_keeps_card_usable() {
        let bank = bank().await;
        let (a, pin) = card(&bank).await;

        let input = format!("2\n{a}\n{pin}\n2\n{}\n2\n1\n1\n0\n", i64::MAX);
        let out = session(&bank, &input).await;

        assert!(out.contains("Enter income:\nIncome was added!\n"));
        assert!(out.contains("Enter income:\nIncorrect input amount\n"));
        assert!(out.contains(&format!("Balance: {}\n", i64::MAX)));
        assert!(bank.check_pin(&a, &pin).await.unwrap());
    }

    #[tokio::test]
    async fn test_close_account() {
        let bank = bank().await;
        let (a, pin) = card(&bank).await;

        let out = session(&bank, &format!("2\n{a}\n{pin}\n4\n2\n{a}\n{pin}\n0\n")).await;

        assert!(out.contains("The account has been closed!\n1. Create an account"));
        assert!(out.contains("Wrong card number or PIN!"));
        assert!(!bank.card_present(&a).await.unwrap());
    }

    #[tokio::test]
    async fn test_bad_input_reprompts() {
        let bank = bank().await;
        let (a, pin) = card(&bank).await;

        let out = session(&bank, &format!("abc\n\n9\n2\n{a}\n{pin}\n2\nlots\n25\nx\n0\n")).await;

        assert!(out.contains("incorrect input, expected a number from 0 to 2\n"));
        assert!(out.contains("Invalid Option\n"));
        assert!(out.contains("Enter income:\nIncorrect input amount\nIncome was added!\n"));
        assert!(out.contains("incorrect input, expected a number from 0 to 5\n"));
        assert_eq!(bank.get_balance(&a).await.unwrap(), Some(25));
    }

    #[tokio::test]
    async fn test_end_of_input_while_logged_in() {
        let bank = bank().await;
        let (a, pin) = card(&bank).await;

        let out = session(&bank, &format!("2\n{a}\n{pin}\n1\n")).await;

        assert!(out.contains("Balance: 0\n"));
        assert!(out.ends_with("Bye!\n"));
    }
}
