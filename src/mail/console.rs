//! Simulated delivery to the terminal.

use async_trait::async_trait;
use chrono::{Local, Utc};
use colored::Colorize;
use std::fmt::Write as _;

use super::{DeliveryReceipt, EmailMessage, Mailer, validate_address};
use crate::core::MailbarsError;

const RULE_WIDTH: usize = 80;

/// Prints each message to stdout instead of sending it.
#[derive(Debug, Clone, Default)]
pub struct ConsoleMailer {
    /// Print only the banner, not the HTML body.
    headers_only: bool,
}

impl ConsoleMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn headers_only(mut self, headers_only: bool) -> Self {
        self.headers_only = headers_only;
        self
    }

    /// The text printed for `message`.
    pub fn format_message(&self, message: &EmailMessage) -> String {
        let heavy = "=".repeat(RULE_WIDTH);
        let mut out = String::new();

        let _ = writeln!(out, "\n{heavy}");
        let _ = writeln!(out, "{}", "EMAIL SENT (SIMULATED)".bold());
        let _ = writeln!(out, "{heavy}");
        let _ = writeln!(out, "From: {}", message.sender());
        let _ = writeln!(out, "To: {}", message.recipient());
        let _ = writeln!(out, "Subject: {}", message.subject);
        let _ = writeln!(out, "Timestamp: {}", Local::now().format("%Y-%m-%d %H:%M:%S"));
        let _ = writeln!(out, "Message-Id: {}", message.id);

        if !message.attachments.is_empty() {
            let _ = writeln!(out, "Attachments: {}", message.attachments.len());
            for attachment in &message.attachments {
                let _ = writeln!(
                    out,
                    "  - {} ({}, {} bytes)",
                    attachment.file_name,
                    attachment.content_type,
                    attachment.content.len()
                );
            }
        }

        if !self.headers_only {
            let _ = writeln!(out, "\nHTML Content:");
            let _ = writeln!(out, "{}", "-".repeat(RULE_WIDTH / 2));
            let _ = writeln!(out, "{}", message.html_body);
            if let Some(text) = &message.plain_text_body {
                let _ = writeln!(out, "\nText Content:");
                let _ = writeln!(out, "{}", "-".repeat(RULE_WIDTH / 2));
                let _ = writeln!(out, "{text}");
            }
        }
        let _ = writeln!(out, "{heavy}");
        out
    }
}

#[async_trait]
impl Mailer for ConsoleMailer {
    async fn send(&self, message: &EmailMessage) -> Result<DeliveryReceipt, MailbarsError> {
        validate_address(&message.to_email)?;

        println!("{}", self.format_message(message));
        tracing::info!(
            message_id = %message.id,
            recipient = %message.to_email,
            subject = %message.subject,
            attachments = message.attachments.len(),
            "Email sent (simulated)"
        );

        Ok(DeliveryReceipt {
            message_id: message.id,
            recipient: message.to_email.clone(),
            sent_at: Utc::now(),
        })
    }
}
