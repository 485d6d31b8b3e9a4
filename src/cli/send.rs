//! Render a stored template and deliver it.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use super::common::{CommandContext, read_data};
use crate::mail::AttachmentData;
use crate::service::Recipient;
use crate::store::{TemplateLookup, content_type_for};

/// Render a stored template and deliver it through the console mailer.
#[derive(Args, Debug)]
pub struct SendCommand {
    /// Template id or name
    template: String,

    /// Recipient address
    #[arg(long)]
    to: String,

    /// Recipient display name
    #[arg(long)]
    to_name: Option<String>,

    /// JSON (or .yaml) file with the data model; `-` reads stdin
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Locale for helpers invoked without one, e.g. de-DE
    #[arg(short, long)]
    locale: Option<String>,

    /// File to attach (repeatable)
    #[arg(short, long = "attach")]
    attachments: Vec<PathBuf>,
}

impl SendCommand {
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let data = read_data(self.data.as_deref()).await?;

        let mut attachments = Vec::with_capacity(self.attachments.len());
        for path in &self.attachments {
            let content = tokio::fs::read(path)
                .await
                .with_context(|| format!("Failed to read attachment {}", path.display()))?;
            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .with_context(|| format!("Invalid attachment path {}", path.display()))?;
            attachments.push(AttachmentData {
                content_type: content_type_for(&file_name).to_string(),
                file_name,
                content,
                content_id: None,
            });
        }

        let mut recipient = Recipient::new(self.to);
        if let Some(name) = self.to_name {
            recipient = recipient.with_name(name);
        }

        let service = ctx.service()?;
        let receipt = service
            .send(
                &TemplateLookup::parse(&self.template),
                &data,
                &recipient,
                attachments,
                self.locale.as_deref(),
            )
            .await?;

        println!(
            "{} Sent message {} to {}",
            "✓".green(),
            receipt.message_id,
            receipt.recipient
        );
        Ok(())
    }
}
