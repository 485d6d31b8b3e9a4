//! Command-line interface for mailbars.
//!
//! Each subcommand lives in its own module with an `execute` method taking
//! the shared [`CommandContext`]:
//!
//! - `render` / `render-text` - render a stored template or ad-hoc text
//! - `send` - render a stored template and deliver it through the console mailer
//! - `templates` / `partials` - inspect the template store
//! - `helpers` - list the helper catalogue
//! - `transform` - show how legacy `%token%` syntax is rewritten
//! - `init` - create a seeded template store
//! - `config` - manage the global configuration file
//!
//! # Global options
//!
//! - `--verbose` / `--quiet` - log level (`RUST_LOG` wins when set)
//! - `--config <PATH>` - config file (also `MAILBARS_CONFIG`)
//! - `--store <DIR>` - template store directory (also `MAILBARS_STORE`)
//!
//! # Examples
//!
//! ```bash
//! mailbars init
//! mailbars render "Welcome Email" --data customer.json --locale de-DE
//! mailbars render-text '%currency:19.99% on %formatDate:2024-03-05%' --locale en-GB
//! mailbars send 1 --to ada@example.com --to-name "Ada" --attach terms.pdf
//! ```

mod common;
mod config;
mod helpers;
mod init;
mod partials;
mod render;
mod send;
mod templates;
mod transform;

pub use common::CommandContext;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::constants::{CONFIG_PATH_ENV, STORE_DIR_ENV};

/// Main CLI structure for mailbars.
#[derive(Parser)]
#[command(
    name = "mailbars",
    about = "Render and send Handlebars email templates",
    version,
    long_about = "mailbars renders HTML email templates with Handlebars, locale-aware \
                  formatting helpers and legacy %token% syntax, and delivers them."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the global config file
    #[arg(short, long, global = true, env = CONFIG_PATH_ENV)]
    config: Option<PathBuf>,

    /// Template store directory
    #[arg(short, long, global = true, env = STORE_DIR_ENV)]
    store: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a stored template
    Render(render::RenderCommand),

    /// Render template text given on the command line
    RenderText(render::RenderTextCommand),

    /// Render a stored template and deliver it (simulated)
    Send(send::SendCommand),

    /// Inspect stored templates
    Templates(templates::TemplatesCommand),

    /// Inspect stored partials
    Partials(partials::PartialsCommand),

    /// List the available template helpers
    Helpers(helpers::HelpersCommand),

    /// Rewrite legacy %token% syntax and print the result
    Transform(transform::TransformCommand),

    /// Create a template store with starter content
    Init(init::InitCommand),

    /// Manage the global configuration
    Config(config::ConfigCommand),
}

impl Cli {
    /// Log filter implied by `--verbose` / `--quiet`.
    #[must_use]
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        }
    }

    /// Install the global tracing subscriber. `RUST_LOG` takes precedence over the flags.
    pub fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.log_level()));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }

    /// Execute the selected command.
    ///
    /// # Errors
    ///
    /// Returns whatever the command fails with; `main` turns it into a
    /// user-friendly message.
    pub async fn execute(self) -> Result<()> {
        let ctx = if matches!(self.command, Commands::Config(_)) {
            CommandContext::load_lenient(self.config, self.store).await?
        } else {
            CommandContext::load(self.config, self.store).await?
        };

        match self.command {
            Commands::Render(cmd) => cmd.execute(&ctx).await,
            Commands::RenderText(cmd) => cmd.execute(&ctx).await,
            Commands::Send(cmd) => cmd.execute(&ctx).await,
            Commands::Templates(cmd) => cmd.execute(&ctx).await,
            Commands::Partials(cmd) => cmd.execute(&ctx).await,
            Commands::Helpers(cmd) => cmd.execute(&ctx),
            Commands::Transform(cmd) => cmd.execute().await,
            Commands::Init(cmd) => cmd.execute(&ctx).await,
            Commands::Config(cmd) => cmd.execute(&ctx).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_log_level_flags() {
        let cli = Cli::parse_from(["mailbars", "--verbose", "helpers"]);
        assert_eq!(cli.log_level(), "debug");
        let cli = Cli::parse_from(["mailbars", "helpers", "-q"]);
        assert_eq!(cli.log_level(), "error");
        let cli = Cli::parse_from(["mailbars", "helpers"]);
        assert_eq!(cli.log_level(), "warn");
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["mailbars", "-v", "-q", "helpers"]).is_err());
    }

    #[test]
    fn test_parse_render_text() {
        let cli = Cli::parse_from([
            "mailbars",
            "render-text",
            "%year%",
            "--locale",
            "de-DE",
            "--partial",
            "footer=footer.hbs",
        ]);
        assert!(matches!(cli.command, Commands::RenderText(_)));
    }
}
