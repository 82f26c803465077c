//! # bank-terminal
//!
//! Text-menu front end for the terminal bank.
//!
//! ## Module Organization
//! ```text
//! bank_terminal/
//! ├── lib.rs      ◄─── Startup: logging, database, menu
//! ├── cli.rs      ◄─── -fileName parsing
//! ├── menu.rs     ◄─── Interactive loop
//! └── error.rs    ◄─── AppError
//! ```
//!
//! ## Startup Sequence
//! 1. Initialize tracing (stderr)
//! 2. Open the database file & run migrations
//! 3. Build the banking service
//! 4. Run the menu on stdin/stdout
//! 5. Close the pool

pub mod cli;
pub mod error;
pub mod menu;

use std::io;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use bank_db::migrations::migration_status;
use bank_db::Database;
use bank_service::{BankService, ServiceConfig};

use crate::cli::TerminalConfig;
use crate::error::AppResult;
use crate::menu::Terminal;

/// Opens the database and runs the menu on the process's stdin/stdout.
pub async fn run(config: TerminalConfig) -> AppResult<()> {
    let db = Database::new(config.db_config()).await?;
    let (total, applied) = migration_status(db.pool()).await?;
    info!(
        path = %config.database_path.display(),
        migrations = total,
        applied,
        "Database ready"
    );

    if !db.health_check().await {
        warn!("Database health check failed; operations may not succeed");
    }

    let bank = BankService::new(db, ServiceConfig::default());

    let result = Terminal::new(&bank, io::stdin().lock(), io::stdout().lock())
        .run()
        .await;

    bank.database().close().await;
    result
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=bank_db=trace` - Show trace for the store only
/// - Default: WARN level
///
/// Logs are written to stderr so they never mix with the menu.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
