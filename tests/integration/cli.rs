//! The `mailbars` binary end to end.

use anyhow::Result;
use predicates::prelude::*;

use crate::common::TestProject;

#[test]
fn test_init_creates_store() -> Result<()> {
    let project = TestProject::new()?;
    project
        .mailbars()
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created template store"));

    assert!(project.store_path().join("templates").join("1-welcome-email.hbs").is_file());
    assert!(project.store_path().join("partials").join("footer.hbs").is_file());

    project.run_mailbars(&["init"])?.assert_failure().assert_stderr_contains("already exists");
    project.run_mailbars(&["init", "--force"])?.assert_success();
    Ok(())
}

#[test]
fn test_templates_and_partials_listing() -> Result<()> {
    let project = TestProject::initialized()?;

    project
        .run_mailbars(&["templates", "list"])?
        .assert_success()
        .assert_stdout_contains("Welcome Email")
        .assert_stdout_contains("Total: 1 templates");

    let output = project.run_mailbars(&["templates", "list", "--json"])?;
    output.assert_success();
    let templates: serde_json::Value = serde_json::from_str(&output.stdout)?;
    assert_eq!(templates[0]["name"], "Welcome Email");

    project
        .run_mailbars(&["partials", "list"])?
        .assert_success()
        .assert_stdout_contains("header")
        .assert_stdout_contains("button");

    project
        .run_mailbars(&["partials", "show", "nope"])?
        .assert_failure()
        .assert_stderr_contains("Partial not found: nope");
    Ok(())
}

#[test]
fn test_render_stored_template_with_data_file() -> Result<()> {
    let project = TestProject::initialized()?;
    project.write_file("ada.json", r#"{"Name": "ada lovelace", "Company": "Acme", "Email": "ada@example.com"}"#)?;

    project
        .mailbars()
        .args(["render", "Welcome Email", "--data", "ada.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Subject: Welcome to Acme, ada lovelace!"))
        .stdout(predicate::str::contains("<h2>Welcome Ada Lovelace!</h2>"));
    Ok(())
}

#[test]
fn test_render_with_yaml_data_and_constants() -> Result<()> {
    let project = TestProject::initialized()?;
    project.write_config("default_locale = \"de-DE\"\n\n[constants]\nCompany = \"Acme GmbH\"\n")?;
    project.write_file("order.yaml", "Total: 1234.5\nName: Ada\n")?;
    project.write_file("body.hbs", "<p>%Company%: {{currency Total}}</p>")?;

    let output = project.run_mailbars(&["render", "1", "-d", "order.yaml", "--body", "body.hbs", "--json"])?;
    output.assert_success();
    let rendered: serde_json::Value = serde_json::from_str(&output.stdout)?;
    assert_eq!(rendered["subject"], "Welcome to Acme GmbH, Ada!");
    assert_eq!(rendered["html_body"], "<p>Acme GmbH: 1.234,50\u{a0}€</p>");
    assert_eq!(rendered["locale"], "de-DE");
    Ok(())
}

#[test]
fn test_render_text_with_partials_and_locale() -> Result<()> {
    let project = TestProject::new()?;
    project.write_file("sig.hbs", "-- {{titleCase Sender}}")?;
    project.write_file("data.json", r#"{"Sender": "grace hopper", "Total": 5}"#)?;

    project
        .mailbars()
        .args([
            "render-text",
            "{{currency Total}} {{> sig}}",
            "--data",
            "data.json",
            "--locale",
            "en-GB",
            "--partial",
            "sig=sig.hbs",
        ])
        .assert()
        .success()
        .stdout("£5.00 -- Grace Hopper\n");
    Ok(())
}

#[test]
fn test_render_text_reads_stdin() -> Result<()> {
    let project = TestProject::new()?;
    project
        .mailbars()
        .args(["render-text", "-"])
        .write_stdin("Hello %uppercase:world%")
        .assert()
        .success()
        .stdout("Hello WORLD\n");
    Ok(())
}

#[test]
fn test_stdin_can_feed_only_one_argument() -> Result<()> {
    let project = TestProject::initialized()?;

    project
        .mailbars()
        .args(["render-text", "-", "--data", "-"])
        .write_stdin(r#"{"Name": "Ada"}"#)
        .assert()
        .failure()
        .stderr(predicate::str::contains("TEXT and --data cannot all read standard input"));

    project
        .mailbars()
        .args(["render", "1", "--body", "-", "--data", "-"])
        .write_stdin("<p>%Name%</p>")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--body and --data cannot all read standard input"));

    project
        .mailbars()
        .args(["render-text", "Hi %Name%", "--data", "-"])
        .write_stdin(r#"{"Name": "Ada"}"#)
        .assert()
        .success()
        .stdout("Hi Ada\n");
    Ok(())
}

#[test]
fn test_render_text_reports_missing_partial_file() -> Result<()> {
    let project = TestProject::new()?;
    project
        .run_mailbars(&["render-text", "{{> sig}}", "--partial", "sig=missing.hbs"])?
        .assert_failure()
        .assert_stderr_contains("Failed to read partial 'sig'");
    Ok(())
}

#[test]
fn test_render_errors_are_user_friendly() -> Result<()> {
    let project = TestProject::new()?;

    project
        .run_mailbars(&["render-text", "%curency:5%"])?
        .assert_failure()
        .assert_stderr_contains("currency");

    project
        .run_mailbars(&["render-text", "{{#if x}}open"])?
        .assert_failure()
        .assert_stderr_contains("syntax");

    project
        .run_mailbars(&["render", "Nope"])?
        .assert_failure()
        .assert_stderr_contains("Template store not found");
    Ok(())
}

#[test]
fn test_send_prints_simulated_email() -> Result<()> {
    let project = TestProject::initialized()?;
    project.write_file("ada.json", r#"{"Name": "Ada", "Company": "Acme"}"#)?;
    project.write_file("terms.txt", "Be nice")?;

    project
        .mailbars()
        .args([
            "send",
            "Welcome Email",
            "--to",
            "ada@example.com",
            "--to-name",
            "Ada",
            "--data",
            "ada.json",
            "--attach",
            "terms.txt",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("EMAIL SENT (SIMULATED)"))
        .stdout(predicate::str::contains("Ada <ada@example.com>"))
        .stdout(predicate::str::contains("terms.txt"))
        .stdout(predicate::str::contains("Sent message"));

    project
        .run_mailbars(&["send", "1", "--to", "not-an-address"])?
        .assert_failure()
        .assert_stderr_contains("Invalid recipient address");
    Ok(())
}

#[test]
fn test_transform_and_helpers() -> Result<()> {
    let project = TestProject::new()?;

    project
        .mailbars()
        .args(["transform", "50% off %year% for %Name%"])
        .assert()
        .success()
        .stdout("50% off {{year}} for {{Name}}\n");

    project
        .run_mailbars(&["helpers"])?
        .assert_success()
        .assert_stdout_contains("formatDate")
        .assert_stdout_contains("currency")
        .assert_stdout_contains("ifNotEmpty");
    Ok(())
}

#[test]
fn test_config_init_and_show() -> Result<()> {
    let project = TestProject::new()?;

    project
        .run_mailbars(&["config", "show"])?
        .assert_success()
        .assert_stdout_contains("file not found");

    project.run_mailbars(&["config", "init"])?.assert_success();
    assert!(project.config_path().is_file());
    project
        .run_mailbars(&["config", "init"])?
        .assert_failure()
        .assert_stderr_contains("already exists");

    project
        .run_mailbars(&["config", "path"])?
        .assert_success()
        .assert_stdout_contains("config.toml");
    Ok(())
}

#[test]
fn test_broken_config_is_reported() -> Result<()> {
    let project = TestProject::initialized()?;
    project.write_config("default_locale = [\n")?;

    project
        .run_mailbars(&["templates", "list"])?
        .assert_failure()
        .assert_stderr_contains("Invalid configuration");

    project.run_mailbars(&["config", "init", "--force"])?.assert_success();
    project.run_mailbars(&["templates", "list"])?.assert_success();
    Ok(())
}
