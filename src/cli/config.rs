//! Manage the global configuration file.

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;

use super::common::CommandContext;
use crate::config::GlobalConfig;
use crate::core::MailbarsError;

/// Manage the global configuration (`~/.mailbars/config.toml`).
#[derive(Args, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    command: Option<ConfigSubcommands>,
}

#[derive(Subcommand, Debug)]
enum ConfigSubcommands {
    /// Write an example configuration file
    Init {
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },

    /// Display the effective configuration
    Show,

    /// Print the configuration file path
    Path,
}

impl ConfigCommand {
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        match self.command.unwrap_or(ConfigSubcommands::Show) {
            ConfigSubcommands::Init {
                force,
            } => Self::init(ctx, force).await,
            ConfigSubcommands::Show => Self::show(ctx),
            ConfigSubcommands::Path => {
                println!("{}", ctx.config_path.display());
                Ok(())
            }
        }
    }

    async fn init(ctx: &CommandContext, force: bool) -> Result<()> {
        if ctx.config_path.exists() && !force {
            return Err(MailbarsError::AlreadyExists {
                path: ctx.config_path.display().to_string(),
            }
            .into());
        }

        let config = GlobalConfig::init_example();
        config.save_to(&ctx.config_path).await?;

        println!("{} Created global config at: {}", "✓".green(), ctx.config_path.display());
        println!("\n{}", "Example configuration:".bold());
        println!("{}", toml::to_string_pretty(&config)?);
        println!("{}", "Next steps:".yellow());
        println!("  1. Set [sender] to the address your mail should come from");
        println!("  2. Add the [constants] your templates use, e.g. Company");
        Ok(())
    }

    fn show(ctx: &CommandContext) -> Result<()> {
        println!("{}", "Global Configuration".bold());
        println!("Location: {}", ctx.config_path.display());
        if !ctx.config_path.exists() {
            println!("{}", "(file not found, showing defaults)".bright_black());
        }
        println!("Store: {}\n", ctx.store_dir.display());
        println!("{}", toml::to_string_pretty(&ctx.config)?);

        if ctx.config.constants.is_empty() {
            println!("{}", "Tip:".yellow());
            println!("  Run 'mailbars config init' to create an example configuration");
        }
        Ok(())
    }
}
