//! Application service: look up a template, render it, deliver it.
//!
//! [`TemplateService`] glues the three collaborators together. For every call
//! it fetches the template and the full partial set from the store and renders
//! subject and body independently through the [`TemplateEngine`], each with
//! the same partials and locale. The partials are scoped to the call, so
//! concurrent renders never see each other's partials.
//!
//! # Examples
//!
//! ```rust,no_run
//! use mailbars::mail::ConsoleMailer;
//! use mailbars::service::{Recipient, TemplateService};
//! use mailbars::store::{MemoryStore, TemplateLookup};
//! use mailbars::templating::TemplateEngine;
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), mailbars::core::MailbarsError> {
//! let service = TemplateService::new(MemoryStore::seeded(), ConsoleMailer::new(), TemplateEngine::default());
//! let data = json!({"Name": "ada lovelace", "Company": "Acme", "Email": "ada@example.com"});
//!
//! let rendered = service.render(&TemplateLookup::parse("Welcome Email"), &data, Some("en-GB")).await?;
//! println!("{}", rendered.subject);
//!
//! service
//!     .send(&TemplateLookup::Id(1), &data, &Recipient::new("ada@example.com"), Vec::new(), None)
//!     .await?;
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::config::SenderConfig;
use crate::core::MailbarsError;
use crate::mail::{AttachmentData, DeliveryReceipt, EmailMessage, Mailer, validate_address};
use crate::store::{EmailTemplate, TemplateLookup, TemplateStore};
use crate::templating::{RenderOptions, TemplateEngine};

/// A template rendered against one data model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedEmail {
    pub template_id: u32,
    pub name: String,
    pub subject: String,
    pub html_body: String,
    /// Locale helpers defaulted to.
    pub locale: String,
    pub rendered_at: DateTime<Utc>,
}

/// Who a message goes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub email: String,
    pub name: Option<String>,
}

impl Recipient {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Renders stored templates and hands them to a mailer.
pub struct TemplateService<S, M> {
    store: S,
    mailer: M,
    engine: TemplateEngine,
    sender: SenderConfig,
}

impl<S: TemplateStore, M: Mailer> TemplateService<S, M> {
    pub fn new(store: S, mailer: M, engine: TemplateEngine) -> Self {
        Self {
            store,
            mailer,
            engine,
            sender: SenderConfig::default(),
        }
    }

    pub fn with_sender(mut self, sender: SenderConfig) -> Self {
        self.sender = sender;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn mailer(&self) -> &M {
        &self.mailer
    }

    pub fn engine(&self) -> &TemplateEngine {
        &self.engine
    }

    /// Render a stored template.
    ///
    /// # Errors
    ///
    /// - [`MailbarsError::TemplateNotFound`] if `lookup` matches nothing
    /// - [`MailbarsError::RenderFailed`] if the subject, body or a partial is malformed
    /// - store errors
    pub async fn render(
        &self,
        lookup: &TemplateLookup,
        data: &Value,
        locale: Option<&str>,
    ) -> Result<RenderedEmail, MailbarsError> {
        self.render_with_override(lookup, None, data, locale).await
    }

    /// Render a stored template's subject with a caller-supplied body.
    ///
    /// An empty or missing `body_override` falls back to the stored body.
    ///
    /// # Errors
    ///
    /// Same as [`TemplateService::render`].
    pub async fn render_with_override(
        &self,
        lookup: &TemplateLookup,
        body_override: Option<&str>,
        data: &Value,
        locale: Option<&str>,
    ) -> Result<RenderedEmail, MailbarsError> {
        let template = self.lookup(lookup).await?;
        let body = body_override.filter(|body| !body.is_empty()).unwrap_or(&template.html_body);
        self.render_template(&template, body, data, locale).await
    }

    /// Render a stored template and deliver it.
    ///
    /// Attachments stored with the template are sent first, followed by
    /// `attachments`.
    ///
    /// # Errors
    ///
    /// - [`MailbarsError::InvalidRecipient`] before anything is rendered
    /// - everything [`TemplateService::render`] returns
    /// - the mailer's delivery error
    pub async fn send(
        &self,
        lookup: &TemplateLookup,
        data: &Value,
        recipient: &Recipient,
        attachments: Vec<AttachmentData>,
        locale: Option<&str>,
    ) -> Result<DeliveryReceipt, MailbarsError> {
        validate_address(&recipient.email)?;

        let template = self.lookup(lookup).await?;
        let rendered = self.render_template(&template, &template.html_body, data, locale).await?;

        let mut all_attachments: Vec<AttachmentData> = self
            .store
            .template_attachments(template.id)
            .await?
            .into_iter()
            .map(AttachmentData::from)
            .collect();
        all_attachments.extend(attachments);

        let message = EmailMessage::new(
            recipient.email.trim(),
            &self.sender.from_email,
            rendered.subject,
            rendered.html_body,
        )
        .with_to_name(recipient.name.clone())
        .with_from_name(Some(self.sender.from_name.clone()))
        .with_attachments(all_attachments);

        tracing::debug!(
            "Delivering '{}' to {} with {} attachment(s)",
            template.name,
            message.to_email,
            message.attachments.len()
        );
        self.mailer.send(&message).await
    }

    async fn lookup(&self, lookup: &TemplateLookup) -> Result<EmailTemplate, MailbarsError> {
        self.store.find_template(lookup).await?.ok_or_else(|| MailbarsError::TemplateNotFound {
            lookup: lookup.to_string(),
        })
    }

    async fn render_template(
        &self,
        template: &EmailTemplate,
        body: &str,
        data: &Value,
        locale: Option<&str>,
    ) -> Result<RenderedEmail, MailbarsError> {
        let partials = self.store.partial_set().await?;
        let mut options = RenderOptions::new().with_partials(partials);
        if let Some(locale) = locale {
            options = options.with_locale(locale);
        }

        // A missing model renders like an empty one
        let empty = Value::Object(serde_json::Map::new());
        let data = if data.is_null() { &empty } else { data };

        let render = |text: &str| {
            self.engine.render(text, data, &options).map_err(|source| {
                tracing::warn!("Failed to render template '{}': {}", template.name, source);
                MailbarsError::RenderFailed {
                    template: template.name.clone(),
                    source,
                }
            })
        };
        let subject = render(&template.subject)?;
        let html_body = render(body)?;

        Ok(RenderedEmail {
            template_id: template.id,
            name: template.name.clone(),
            subject,
            html_body,
            locale: locale.unwrap_or(self.engine.default_locale()).to_string(),
            rendered_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mail::RecordingMailer;
    use crate::store::{Attachment, MemoryStore, Partial};
    use crate::templating::TemplateError;
    use anyhow::Result;
    use serde_json::json;

    fn service() -> TemplateService<MemoryStore, RecordingMailer> {
        TemplateService::new(MemoryStore::seeded(), RecordingMailer::new(), TemplateEngine::default())
    }

    fn welcome_data() -> Value {
        json!({"Name": "ada lovelace", "Company": "Acme", "Email": "ada@example.com"})
    }

    #[tokio::test]
    async fn test_render_seeded_welcome() -> Result<()> {
        let rendered = service().render(&TemplateLookup::First, &welcome_data(), None).await?;
        assert_eq!(rendered.subject, "Welcome to Acme, ada lovelace!");
        assert!(rendered.html_body.contains("<h2>Welcome Ada Lovelace!</h2>"));
        assert!(rendered.html_body.contains("<strong>Your email:</strong> ada@example.com"));
        assert!(rendered.html_body.contains("Acme. All rights reserved."));
        assert_eq!(rendered.locale, "en-US");
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_template() {
        let err = service()
            .render(&TemplateLookup::Name("Nope".to_string()), &json!({}), None)
            .await
            .unwrap_err();
        assert!(matches!(err, MailbarsError::TemplateNotFound { .. }));
    }

    #[tokio::test]
    async fn test_render_with_override() -> Result<()> {
        let service = service();
        let rendered = service
            .render_with_override(
                &TemplateLookup::Id(1),
                Some("<p>{{currency Total}}</p>"),
                &json!({"Total": 1234.5, "Company": "Acme", "Name": "Ada"}),
                Some("de-DE"),
            )
            .await?;
        assert_eq!(rendered.html_body, "<p>1.234,50\u{a0}€</p>");
        assert_eq!(rendered.subject, "Welcome to Acme, Ada!");
        assert_eq!(rendered.locale, "de-DE");

        let fallback = service.render_with_override(&TemplateLookup::Id(1), Some(""), &json!({}), None).await?;
        assert!(fallback.html_body.starts_with("<!DOCTYPE html>"));
        Ok(())
    }

    #[tokio::test]
    async fn test_broken_partial_fails_render() -> Result<()> {
        let service = service();
        service
            .store()
            .upsert_partial(Partial {
                id: 0,
                name: "footer".to_string(),
                html_content: "{{#if x}}open{{/each}}".to_string(),
            })
            .await?;
        let err = service.render(&TemplateLookup::Id(1), &welcome_data(), None).await.unwrap_err();
        match err {
            MailbarsError::RenderFailed {
                source: TemplateError::PartialSyntax { name, .. },
                ..
            } => assert_eq!(name, "footer"),
            other => panic!("expected partial syntax error, got {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_send_merges_attachments() -> Result<()> {
        let service = service().with_sender(SenderConfig {
            from_email: "noreply@acme.test".to_string(),
            from_name: "Acme".to_string(),
        });
        service
            .store()
            .add_attachment(Attachment {
                id: 0,
                template_id: 1,
                file_name: "terms.pdf".to_string(),
                content_type: "application/pdf".to_string(),
                content: b"%PDF".to_vec(),
            })
            .await?;

        let extra = AttachmentData {
            file_name: "invoice.csv".to_string(),
            content_type: "text/csv".to_string(),
            content: b"a,b".to_vec(),
            content_id: None,
        };
        let recipient = Recipient::new("ada@example.com").with_name("Ada");
        let receipt = service
            .send(&TemplateLookup::Id(1), &welcome_data(), &recipient, vec![extra], None)
            .await?;

        let sent = service.mailer().sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].id, receipt.message_id);
        assert_eq!(sent[0].sender(), "Acme <noreply@acme.test>");
        assert_eq!(sent[0].recipient(), "Ada <ada@example.com>");
        let names: Vec<_> = sent[0].attachments.iter().map(|a| a.file_name.as_str()).collect();
        assert_eq!(names, ["terms.pdf", "invoice.csv"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_send_rejects_bad_recipient_before_rendering() {
        let service = service();
        let err = service
            .send(&TemplateLookup::Name("missing".to_string()), &json!({}), &Recipient::new("bad"), Vec::new(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, MailbarsError::InvalidRecipient { .. }));
        assert!(service.mailer().sent().await.is_empty());
    }
}
