//! Command-line parsing.
//!
//! ```bash
//! bank-terminal -fileName ./card.s3db
//! bank-terminal --help
//! ```
//!
//! The flag name is matched case-insensitively, so `-filename` and
//! `-FILENAME` work too. Unknown arguments are ignored.

use std::path::PathBuf;

use bank_db::DbConfig;

use crate::error::{AppError, AppResult};

/// Flag naming the database file.
pub const FILE_NAME_FLAG: &str = "-fileName";

/// What the process was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the menu against a database file.
    Run(TerminalConfig),
    /// Print usage and exit.
    Help,
}

/// Terminal configuration taken from argv.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalConfig {
    /// SQLite file holding cards and accounts. Created if missing.
    pub database_path: PathBuf,
}

impl TerminalConfig {
    pub fn new(database_path: impl Into<PathBuf>) -> Self {
        TerminalConfig {
            database_path: database_path.into(),
        }
    }

    /// Database configuration for this file.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path)
    }
}

/// Parses arguments, not including the program name.
///
/// ## Errors
/// * `MissingArguments` - No arguments at all
/// * `MissingFileName` - No `-fileName`, or no non-empty value after it
pub fn parse_args<I>(args: I) -> AppResult<Command>
where
    I: IntoIterator<Item = String>,
{
    let args: Vec<String> = args.into_iter().collect();
    if args.is_empty() {
        return Err(AppError::MissingArguments);
    }

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => return Ok(Command::Help),
            flag if flag.eq_ignore_ascii_case(FILE_NAME_FLAG) => {
                return match args.get(i + 1) {
                    Some(path) if !path.is_empty() => {
                        Ok(Command::Run(TerminalConfig::new(path)))
                    }
                    _ => Err(AppError::MissingFileName),
                };
            }
            _ => {}
        }
        i += 1;
    }

    Err(AppError::MissingFileName)
}

/// Usage text for `--help`.
pub fn usage() -> String {
    [
        "Terminal Bank",
        "",
        "Usage: bank-terminal -fileName <PATH>",
        "",
        "Options:",
        "  -fileName <PATH>   SQLite database file (created if missing)",
        "  -h, --help         Show this help message",
        "",
        "Set RUST_LOG (e.g. RUST_LOG=debug) for diagnostics on stderr.",
    ]
    .join("\n")
}
