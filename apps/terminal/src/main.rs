//! # Terminal Bank Entry Point
//!
//! ```bash
//! bank-terminal -fileName card.s3db
//! ```
//!
//! Startup problems (missing `-fileName`, unusable database file) are
//! printed on stdout and end the process with exit code 1.

use std::env;
use std::process::ExitCode;

use tracing::error;

use bank_terminal::cli::{self, Command};

#[tokio::main]
async fn main() -> ExitCode {
    bank_terminal::init_tracing();

    let config = match cli::parse_args(env::args().skip(1)) {
        Ok(Command::Run(config)) => config,
        Ok(Command::Help) => {
            println!("{}", cli::usage());
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            println!("{e}");
            return ExitCode::from(1);
        }
    };

    match bank_terminal::run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Terminal stopped");
            println!("{e}");
            ExitCode::from(1)
        }
    }
}
