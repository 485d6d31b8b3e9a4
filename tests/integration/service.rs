//! Render-and-deliver through the template service.

use anyhow::Result;
use mailbars::config::{GlobalConfig, SenderConfig};
use mailbars::core::MailbarsError;
use mailbars::mail::{AttachmentData, RecordingMailer};
use mailbars::service::{Recipient, TemplateService};
use mailbars::store::{DirectoryStore, Partial, TemplateLookup, TemplateStore};
use mailbars::templating::TemplateError;
use mailbars::test_utils::{DataFixture, TestEnvironment};
use serde_json::json;
use std::collections::BTreeMap;

fn acme_config() -> GlobalConfig {
    GlobalConfig {
        sender: SenderConfig {
            from_email: "noreply@acme.test".to_string(),
            from_name: "Acme".to_string(),
        },
        constants: BTreeMap::from([("Company".to_string(), "Acme".to_string())]),
        ..GlobalConfig::default()
    }
}

async fn service(env: &TestEnvironment) -> Result<TemplateService<DirectoryStore, RecordingMailer>> {
    let config = acme_config();
    Ok(TemplateService::new(env.store()?, RecordingMailer::new(), config.engine()?).with_sender(config.sender))
}

#[tokio::test]
async fn test_welcome_uses_constants_and_store_partials() -> Result<()> {
    let env = TestEnvironment::seeded().await?;
    let service = service(&env).await?;

    let rendered = service
        .render(&TemplateLookup::First, &json!({"Name": "ada lovelace", "Email": "ada@example.com"}), None)
        .await?;

    assert_eq!(rendered.template_id, 1);
    assert_eq!(rendered.subject, "Welcome to Acme, ada lovelace!");
    assert!(rendered.html_body.contains("<h1 style=\"margin: 0;\">Acme</h1>"));
    assert!(rendered.html_body.contains("<h2>Welcome Ada Lovelace!</h2>"));
    assert!(rendered.html_body.contains("Acme. All rights reserved."));
    assert!(!rendered.html_body.contains("{{"), "{}", rendered.html_body);
    Ok(())
}

#[tokio::test]
async fn test_email_section_follows_data() -> Result<()> {
    let env = TestEnvironment::seeded().await?;
    let service = service(&env).await?;

    let rendered = service.render(&TemplateLookup::Id(1), &DataFixture::welcome(), None).await?;
    assert!(rendered.html_body.contains("<strong>Your email:</strong> ada@example.com"));

    let without_email = service.render(&TemplateLookup::Id(1), &json!({"Name": "Ada"}), None).await?;
    assert!(!without_email.html_body.contains("Your email:"));
    Ok(())
}

#[tokio::test]
async fn test_edited_partial_is_picked_up() -> Result<()> {
    let env = TestEnvironment::seeded().await?;
    let service = service(&env).await?;

    service
        .store()
        .upsert_partial(Partial {
            id: 0,
            name: "footer".to_string(),
            html_content: "<footer>%Company% · %currency:0%</footer>".to_string(),
        })
        .await?;

    let rendered = service.render(&TemplateLookup::First, &DataFixture::welcome(), Some("en-GB")).await?;
    assert!(rendered.html_body.contains("<footer>Acme · £0.00</footer>"), "{}", rendered.html_body);
    assert_eq!(rendered.locale, "en-GB");
    Ok(())
}

#[tokio::test]
async fn test_broken_template_reports_render_failure() -> Result<()> {
    let env = TestEnvironment::seeded().await?;
    let service = service(&env).await?;

    let err = service
        .render_with_override(&TemplateLookup::First, Some("{{#if Name}}"), &json!({}), None)
        .await
        .unwrap_err();
    match err {
        MailbarsError::RenderFailed {
            template,
            source,
        } => {
            assert_eq!(template, "Welcome Email");
            assert!(matches!(source, TemplateError::Syntax { .. }));
        }
        other => panic!("expected RenderFailed, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn test_send_delivers_with_stored_and_extra_attachments() -> Result<()> {
    let env = TestEnvironment::seeded().await?;
    env.create_file("store/attachments/1/terms.pdf", "%PDF-1.4")?;
    let service = service(&env).await?;

    let extra = AttachmentData {
        file_name: "invoice.csv".to_string(),
        content_type: "text/csv".to_string(),
        content: b"id,total\n1,10".to_vec(),
        content_id: None,
    };
    let receipt = service
        .send(
            &TemplateLookup::parse("Welcome Email"),
            &DataFixture::welcome(),
            &Recipient::new("ada@example.com").with_name("Ada"),
            vec![extra],
            None,
        )
        .await?;

    let sent = service.mailer().sent().await;
    assert_eq!(sent.len(), 1);
    let message = &sent[0];
    assert_eq!(message.id, receipt.message_id);
    assert_eq!(message.sender(), "Acme <noreply@acme.test>");
    assert_eq!(message.recipient(), "Ada <ada@example.com>");
    assert_eq!(message.subject, "Welcome to Acme, ada lovelace!");

    let names: Vec<&str> = message.attachments.iter().map(|a| a.file_name.as_str()).collect();
    assert_eq!(names, ["terms.pdf", "invoice.csv"]);
    assert_eq!(message.attachments[0].content_type, "application/pdf");
    Ok(())
}

#[tokio::test]
async fn test_send_to_unknown_template() -> Result<()> {
    let env = TestEnvironment::seeded().await?;
    let service = service(&env).await?;

    let err = service
        .send(&TemplateLookup::Id(42), &json!({}), &Recipient::new("ada@example.com"), Vec::new(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, MailbarsError::TemplateNotFound { .. }));
    assert!(service.mailer().sent().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_send_surfaces_delivery_failure() -> Result<()> {
    let env = TestEnvironment::seeded().await?;
    let config = acme_config();
    let service = TemplateService::new(env.store()?, RecordingMailer::rejecting("relay unavailable"), config.engine()?)
        .with_sender(config.sender);

    let err = service
        .send(&TemplateLookup::First, &DataFixture::welcome(), &Recipient::new("ada@example.com"), Vec::new(), None)
        .await
        .unwrap_err();
    match err {
        MailbarsError::DeliveryFailed {
            recipient,
            reason,
        } => {
            assert_eq!(recipient, "ada@example.com");
            assert_eq!(reason, "relay unavailable");
        }
        other => panic!("expected DeliveryFailed, got {other:?}"),
    }
    assert!(service.mailer().sent().await.is_empty());
    Ok(())
}
