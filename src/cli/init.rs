//! Create a template store with starter content.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use super::common::CommandContext;
use crate::store::DirectoryStore;

/// Create a template store seeded with a welcome template and partials.
#[derive(Args, Debug)]
pub struct InitCommand {
    /// Directory to create the store in (defaults to --store or the configured store)
    path: Option<PathBuf>,

    /// Overwrite the starter files of an existing store
    #[arg(short, long)]
    force: bool,
}

impl InitCommand {
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let root = self.path.unwrap_or_else(|| ctx.store_dir.clone());
        let store = DirectoryStore::init(&root, self.force).await?;

        println!("{} Created template store at {}", "✓".green(), store.root().display());
        println!();
        println!("{}", "Next steps:".yellow());
        println!("  mailbars templates list --store {}", root.display());
        println!(
            "  mailbars render \"Welcome Email\" --store {} --data customer.json",
            root.display()
        );
        Ok(())
    }
}
