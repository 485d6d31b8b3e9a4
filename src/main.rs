//! mailbars CLI entry point
//!
//! Parses command-line arguments, installs logging, runs the selected command
//! and prints failures as user-friendly errors with suggestions.

use anyhow::Result;
use clap::Parser;
use mailbars::cli;
use mailbars::core::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.init_logging();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            user_friendly_error(e).display();
            std::process::exit(1);
        }
    }
}
