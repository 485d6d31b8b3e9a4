//! Print the helper catalogue.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::collections::BTreeMap;

use super::common::CommandContext;
use crate::templating::{CatalogEntry, HelperCategory};

/// List the available template helpers.
#[derive(Args, Debug)]
pub struct HelpersCommand {
    /// Only show helpers of this category (e.g. number, text)
    #[arg(long)]
    category: Option<String>,
}

impl HelpersCommand {
    pub fn execute(self, ctx: &CommandContext) -> Result<()> {
        let engine = ctx.engine()?;

        let mut groups: BTreeMap<HelperCategory, Vec<CatalogEntry>> = BTreeMap::new();
        for entry in engine.helpers().catalog() {
            groups.entry(entry.category).or_default().push(entry);
        }

        if let Some(wanted) = &self.category {
            groups.retain(|category, _| category.to_string().to_lowercase().starts_with(&wanted.to_lowercase()));
            if groups.is_empty() {
                anyhow::bail!("No helper category matches '{wanted}'");
            }
        }

        for (category, entries) in &groups {
            println!("{}:", category.to_string().cyan().bold());
            for entry in entries {
                println!("  {:<14} {:<6} {}", entry.name.bright_white(), entry.kind.bright_black(), entry.description);
                println!("  {:<14} {:<6} {}", "", "", entry.usage.yellow());
            }
            println!();
        }
        println!(
            "Helpers that take a locale also accept {}; the default is {}.",
            "locale=\"xx-YY\"".cyan(),
            engine.default_locale().cyan()
        );
        Ok(())
    }
}
