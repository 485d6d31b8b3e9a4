//! Inspect stored templates.

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;

use super::common::CommandContext;
use crate::core::MailbarsError;
use crate::store::{TemplateLookup, TemplateStore};

#[derive(Args, Debug)]
pub struct TemplatesCommand {
    #[command(subcommand)]
    command: TemplatesSubcommand,
}

#[derive(Subcommand, Debug)]
enum TemplatesSubcommand {
    /// List stored templates
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a template's subject, body and attachments
    Show {
        /// Template id or name
        template: String,
    },
}

impl TemplatesCommand {
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let store = ctx.open_store()?;
        match self.command {
            TemplatesSubcommand::List {
                json,
            } => {
                let templates = store.list_templates().await?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&templates)?);
                    return Ok(());
                }
                if templates.is_empty() {
                    println!("No templates found in {}", ctx.store_dir.display());
                    return Ok(());
                }
                println!("{}", "Templates".bold());
                println!();
                println!("{:>4}  {:<30}  {}", "ID".bold(), "NAME".bold(), "SUBJECT".bold());
                println!("{}", "-".repeat(80).bright_black());
                for template in &templates {
                    println!("{:>4}  {:<30}  {}", template.id, template.name, template.subject.bright_black());
                }
                println!();
                println!("{}: {} templates", "Total".green().bold(), templates.len());
            }
            TemplatesSubcommand::Show {
                template,
            } => {
                let lookup = TemplateLookup::parse(&template);
                let template = store.find_template(&lookup).await?.ok_or_else(|| {
                    MailbarsError::TemplateNotFound {
                        lookup: lookup.to_string(),
                    }
                })?;
                let attachments = store.template_attachments(template.id).await?;

                println!("{} #{} {}", "Template".bold(), template.id, template.name.cyan());
                println!("{} {}", "Subject:".bold(), template.subject);
                if !attachments.is_empty() {
                    println!("{}", "Attachments:".bold());
                    for attachment in &attachments {
                        println!(
                            "  - {} ({}, {} bytes)",
                            attachment.file_name,
                            attachment.content_type,
                            attachment.content.len()
                        );
                    }
                }
                println!();
                println!("{}", template.html_body);
            }
        }
        Ok(())
    }
}
