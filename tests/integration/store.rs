//! Directory store layout and persistence.

use anyhow::Result;
use mailbars::core::MailbarsError;
use mailbars::store::{Attachment, DirectoryStore, EmailTemplate, TemplateLookup, TemplateStore};
use mailbars::test_utils::TestEnvironment;

#[tokio::test]
async fn test_seeded_layout() -> Result<()> {
    let env = TestEnvironment::seeded().await?;

    assert!(env.file_exists("store/templates/1-welcome-email.hbs"));
    for partial in ["header", "footer", "button"] {
        assert!(env.file_exists(format!("store/partials/{partial}.hbs")), "{partial}");
    }

    let file = env.read_file("store/templates/1-welcome-email.hbs")?;
    assert!(file.starts_with("---\n"), "{file}");
    assert!(file.contains("name: Welcome Email"), "{file}");
    Ok(())
}

#[tokio::test]
async fn test_hand_written_template_is_listed() -> Result<()> {
    let env = TestEnvironment::seeded().await?;
    env.create_file(
        "store/templates/7-receipt.hbs",
        "---\nid: 7\nname: Receipt\nsubject: \"Receipt for {{OrderId}}\"\n---\n<p>Total %currency:12%</p>\n",
    )?;

    let store = env.store()?;
    let names: Vec<String> = store.list_templates().await?.into_iter().map(|t| t.name).collect();
    assert_eq!(names, ["Welcome Email", "Receipt"]);

    let receipt = store.find_template(&TemplateLookup::parse("Receipt")).await?.expect("receipt");
    assert_eq!(receipt.id, 7);
    assert_eq!(receipt.subject, "Receipt for {{OrderId}}");
    assert_eq!(receipt.html_body, "<p>Total %currency:12%</p>");

    let by_id = store.find_template(&TemplateLookup::parse("7")).await?.expect("by id");
    assert_eq!(by_id, receipt);
    Ok(())
}

#[tokio::test]
async fn test_changes_survive_reopening() -> Result<()> {
    let env = TestEnvironment::seeded().await?;

    let created = env
        .store()?
        .upsert_template(EmailTemplate {
            id: 0,
            name: "Password Reset".to_string(),
            subject: "Reset your password".to_string(),
            html_body: "{{> button url=ResetUrl text=\"Reset\"}}".to_string(),
        })
        .await?;
    assert_eq!(created.id, 2);

    env.store()?
        .add_attachment(Attachment {
            id: 0,
            template_id: created.id,
            file_name: "policy.txt".to_string(),
            content_type: "text/plain".to_string(),
            content: b"Be safe".to_vec(),
        })
        .await?;

    let reopened = DirectoryStore::open(env.store_path())?;
    let template = reopened.get_template(2).await?.expect("template persisted");
    assert_eq!(template, created);

    let attachments = reopened.template_attachments(2).await?;
    assert_eq!(attachments.len(), 1);
    assert_eq!(attachments[0].file_name, "policy.txt");
    assert_eq!(attachments[0].content, b"Be safe");

    assert!(reopened.delete_template(2).await?);
    assert!(reopened.template_attachments(2).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_uninitialized_store() -> Result<()> {
    let env = TestEnvironment::new()?;
    let err = DirectoryStore::open(env.store_path()).unwrap_err();
    assert!(matches!(err, MailbarsError::StoreNotFound { .. }));
    Ok(())
}
