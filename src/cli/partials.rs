//! Inspect stored partials.

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;

use super::common::CommandContext;
use crate::core::MailbarsError;
use crate::store::TemplateStore;

#[derive(Args, Debug)]
pub struct PartialsCommand {
    #[command(subcommand)]
    command: PartialsSubcommand,
}

#[derive(Subcommand, Debug)]
enum PartialsSubcommand {
    /// List stored partials
    List,
    /// Print a partial's body
    Show {
        name: String,
    },
}

impl PartialsCommand {
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let store = ctx.open_store()?;
        match self.command {
            PartialsSubcommand::List => {
                let partials = store.list_partials().await?;
                if partials.is_empty() {
                    println!("No partials found in {}", ctx.store_dir.display());
                    return Ok(());
                }
                println!("{}", "Partials".bold());
                println!();
                for partial in &partials {
                    println!(
                        "  {} {}",
                        partial.name.bright_white(),
                        format!("({} bytes)", partial.html_content.len()).bright_black()
                    );
                }
                println!();
                println!("Use them in a template as {}", "{{> name}}".cyan());
            }
            PartialsSubcommand::Show {
                name,
            } => {
                let partial = store.get_partial_by_name(&name).await?.ok_or_else(|| {
                    MailbarsError::PartialNotFound {
                        name: name.clone(),
                    }
                })?;
                println!("{}", partial.html_content);
            }
        }
        Ok(())
    }
}
