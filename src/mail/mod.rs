//! Delivery collaborator.
//!
//! The template engine produces strings; this module turns a rendered subject
//! and body into an [`EmailMessage`] and hands it to a [`Mailer`]. The only
//! transport that ships is [`ConsoleMailer`], which simulates delivery by
//! printing the message. [`RecordingMailer`] keeps messages in memory for tests
//! and embedding applications.

mod console;

pub use console::ConsoleMailer;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, LazyLock};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::core::MailbarsError;

static EMAIL_ADDRESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@<>()\[\],;:]+@[^\s@<>()\[\],;:]+\.[^\s@<>()\[\],;:.][^\s@<>()\[\],;:]*$")
        .expect("email address pattern is valid")
});

/// A file sent with a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentData {
    pub file_name: String,
    pub content_type: String,
    #[serde(skip)]
    pub content: Vec<u8>,
    /// Content id for inline attachments referenced as `cid:` in the body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_id: Option<String>,
}

impl From<crate::store::Attachment> for AttachmentData {
    fn from(attachment: crate::store::Attachment) -> Self {
        Self {
            file_name: attachment.file_name,
            content_type: attachment.content_type,
            content: attachment.content,
            content_id: None,
        }
    }
}

/// A fully rendered message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub id: Uuid,
    pub to_email: String,
    pub to_name: Option<String>,
    pub from_email: String,
    pub from_name: Option<String>,
    pub subject: String,
    pub html_body: String,
    pub plain_text_body: Option<String>,
    pub attachments: Vec<AttachmentData>,
}

impl EmailMessage {
    /// A message with a fresh id and no attachments.
    pub fn new(
        to_email: impl Into<String>,
        from_email: impl Into<String>,
        subject: impl Into<String>,
        html_body: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            to_email: to_email.into(),
            to_name: None,
            from_email: from_email.into(),
            from_name: None,
            subject: subject.into(),
            html_body: html_body.into(),
            plain_text_body: None,
            attachments: Vec::new(),
        }
    }

    pub fn with_to_name(mut self, name: Option<String>) -> Self {
        self.to_name = name.filter(|n| !n.trim().is_empty());
        self
    }

    pub fn with_from_name(mut self, name: Option<String>) -> Self {
        self.from_name = name.filter(|n| !n.trim().is_empty());
        self
    }

    pub fn with_attachments(mut self, attachments: Vec<AttachmentData>) -> Self {
        self.attachments = attachments;
        self
    }

    /// `Name <address>`, or the bare address without a name.
    pub fn recipient(&self) -> String {
        mailbox(self.to_name.as_deref(), &self.to_email)
    }

    pub fn sender(&self) -> String {
        mailbox(self.from_name.as_deref(), &self.from_email)
    }
}

fn mailbox(name: Option<&str>, address: &str) -> String {
    match name {
        Some(name) => format!("{name} <{address}>"),
        None => address.to_string(),
    }
}

/// Proof of delivery returned by a [`Mailer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    pub message_id: Uuid,
    pub recipient: String,
    pub sent_at: DateTime<Utc>,
}

/// Reject addresses that are not of the form `local@domain.tld`.
///
/// # Errors
///
/// [`MailbarsError::InvalidRecipient`] for a malformed address.
pub fn validate_address(address: &str) -> Result<(), MailbarsError> {
    if EMAIL_ADDRESS.is_match(address.trim()) {
        Ok(())
    } else {
        Err(MailbarsError::InvalidRecipient {
            address: address.to_string(),
        })
    }
}

/// A transport that delivers rendered messages.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<DeliveryReceipt, MailbarsError>;
}

/// Mailer that keeps every delivered message in memory.
///
/// A mailer built with [`RecordingMailer::rejecting`] refuses every message,
/// the way a transport that is down would.
#[derive(Debug, Clone, Default)]
pub struct RecordingMailer {
    sent: Arc<Mutex<Vec<EmailMessage>>>,
    reject_with: Option<String>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mailer that fails every delivery with `reason`.
    pub fn rejecting(reason: impl Into<String>) -> Self {
        Self {
            reject_with: Some(reason.into()),
            ..Self::default()
        }
    }

    /// Messages delivered so far, oldest first.
    pub async fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &EmailMessage) -> Result<DeliveryReceipt, MailbarsError> {
        validate_address(&message.to_email)?;
        if let Some(reason) = &self.reject_with {
            tracing::warn!(
                message_id = %message.id,
                recipient = %message.to_email,
                "Delivery rejected: {}",
                reason
            );
            return Err(MailbarsError::DeliveryFailed {
                recipient: message.to_email.clone(),
                reason: reason.clone(),
            });
        }
        self.sent.lock().await.push(message.clone());
        Ok(DeliveryReceipt {
            message_id: message.id,
            recipient: message.to_email.clone(),
            sent_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_address() {
        for ok in ["ada@example.com", "first.last+tag@mail.example.co.uk", " ada@example.com "] {
            assert!(validate_address(ok).is_ok(), "{ok}");
        }
        for bad in ["", "ada", "ada@", "@example.com", "ada@example", "a b@example.com", "ada@example."] {
            assert!(
                matches!(validate_address(bad), Err(MailbarsError::InvalidRecipient { .. })),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_mailbox_formatting() {
        let message = EmailMessage::new("ada@example.com", "noreply@example.com", "Hi", "<p>Hi</p>")
            .with_to_name(Some("Ada".to_string()))
            .with_from_name(Some("  ".to_string()));
        assert_eq!(message.recipient(), "Ada <ada@example.com>");
        assert_eq!(message.sender(), "noreply@example.com");
    }

    #[tokio::test]
    async fn test_recording_mailer() -> anyhow::Result<()> {
        let mailer = RecordingMailer::new();
        let message = EmailMessage::new("ada@example.com", "noreply@example.com", "Hi", "<p>Hi</p>");
        let receipt = mailer.send(&message).await?;
        assert_eq!(receipt.message_id, message.id);
        assert_eq!(mailer.sent().await, vec![message]);

        let bad = EmailMessage::new("nope", "noreply@example.com", "Hi", "");
        assert!(mailer.send(&bad).await.is_err());
        assert_eq!(mailer.sent().await.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_rejecting_mailer_reports_delivery_failure() {
        let mailer = RecordingMailer::rejecting("relay unavailable");
        let message = EmailMessage::new("ada@example.com", "noreply@example.com", "Hi", "<p>Hi</p>");

        let err = mailer.send(&message).await.unwrap_err();
        match &err {
            MailbarsError::DeliveryFailed {
                recipient,
                reason,
            } => {
                assert_eq!(recipient, "ada@example.com");
                assert_eq!(reason, "relay unavailable");
            }
            other => panic!("expected DeliveryFailed, got {other:?}"),
        }
        assert_eq!(err.to_string(), "Failed to deliver message to ada@example.com: relay unavailable");
        assert!(mailer.sent().await.is_empty());

        let bad = EmailMessage::new("nope", "noreply@example.com", "Hi", "");
        assert!(matches!(mailer.send(&bad).await, Err(MailbarsError::InvalidRecipient { .. })));
    }
}
