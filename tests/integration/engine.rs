//! Rendering through the public engine API.

use anyhow::Result;
use mailbars::templating::{
    EngineConfig, HelperRegistry, RenderOptions, TemplateEngine, TemplateError, transform,
};
use mailbars::test_utils::{DataFixture, init_test_logging};
use serde_json::json;

fn footer_options() -> RenderOptions {
    RenderOptions::new().with_partial("footer", "<footer>Thanks for shopping</footer>")
}

#[test]
fn test_order_confirmation_renders() -> Result<()> {
    init_test_logging(None);

    let engine = TemplateEngine::default();
    let html = engine.render(DataFixture::ORDER_TEMPLATE, &DataFixture::order(), &footer_options())?;

    assert_eq!(
        html,
        concat!(
            "<h1>Order A-1001</h1>",
            "<p>Hello Grace Hopper,</p>",
            "<p>Placed 2024-03-05, total $1,234.50, discount 12.50%.</p>",
            "<p>Free shipping!</p>",
            "<footer>Thanks for shopping</footer>"
        )
    );
    Ok(())
}

#[test]
fn test_order_confirmation_in_german() -> Result<()> {
    let engine = TemplateEngine::default();
    let options = footer_options().with_locale("de-DE");
    let html = engine.render(DataFixture::ORDER_TEMPLATE, &DataFixture::order(), &options)?;

    assert!(html.contains("total 1.234,50\u{a0}€"), "{html}");
    assert!(html.contains("discount 12,50\u{a0}%"), "{html}");
    Ok(())
}

#[test]
fn test_legacy_tokens_mix_with_native_syntax() -> Result<()> {
    let engine = TemplateEngine::default();
    let data = json!({"Name": "Ada", "Total": 19.99});

    let html = engine.render(
        "<p>Hi %Name%, you owe %currency:19.99% ({{currency Total \"en-GB\"}}).</p>",
        &data,
        &RenderOptions::new(),
    )?;
    assert_eq!(html, "<p>Hi Ada, you owe $19.99 (£19.99).</p>");
    Ok(())
}

#[test]
fn test_percent_signs_survive() -> Result<()> {
    let engine = TemplateEngine::default();
    let html = engine.render("Save 50% today, %Name%!", &json!({"Name": "Ada"}), &RenderOptions::new())?;
    assert_eq!(html, "Save 50% today, Ada!");
    assert_eq!(transform("100% guaranteed"), "100% guaranteed");
    Ok(())
}

#[test]
fn test_plain_text_is_returned_verbatim() -> Result<()> {
    let engine = TemplateEngine::default();
    let text = "<p>No placeholders here & nothing to escape</p>";
    assert_eq!(engine.render(text, &json!({"Name": "x"}), &RenderOptions::new())?, text);
    Ok(())
}

#[test]
fn test_configured_constants_and_locale() -> Result<()> {
    let helpers = HelperRegistry::with_constants([("Company", "Acme"), ("SupportEmail", "help@acme.test")])?;
    let config = EngineConfig {
        default_locale: "en-GB".to_string(),
        ..EngineConfig::default()
    };
    let engine = TemplateEngine::new(helpers, config);

    let html = engine.render(
        "%Company% <%SupportEmail%> {{currency 5}}",
        &json!({}),
        &RenderOptions::new(),
    )?;
    assert_eq!(html, "Acme <help@acme.test> £5.00");
    Ok(())
}

#[test]
fn test_misspelled_helper_gets_suggestion() {
    let engine = TemplateEngine::default();
    let err = engine
        .render("{{formatNumbr 3 \"N2\"}}", &json!({}), &RenderOptions::new())
        .unwrap_err();

    assert!(!err.is_malformed_template());
    assert_eq!(err.suggestion(), Some("formatNumber"));
    assert!(err.format_with_context().contains("formatNumber"));
}

#[test]
fn test_syntax_errors_are_reported_before_rendering() {
    let engine = TemplateEngine::default();
    let err = engine.render("{{#if Name}}unclosed", &json!({}), &RenderOptions::new()).unwrap_err();
    assert!(err.is_malformed_template());
    assert!(matches!(err, TemplateError::Syntax { .. }));
}

#[test]
fn test_broken_partial_is_named() {
    let engine = TemplateEngine::default();
    let options = RenderOptions::new().with_partial("footer", "{{#each items}}");
    let err = engine.render("{{> footer}}", &json!({}), &options).unwrap_err();

    match err {
        TemplateError::PartialSyntax {
            name, ..
        } => assert_eq!(name, "footer"),
        other => panic!("expected PartialSyntax, got {other:?}"),
    }
}

#[test]
fn test_compiled_template_reused_across_models() -> Result<()> {
    let engine = TemplateEngine::default();
    let compiled = engine.compile("Dear %titleCase:x% {{titleCase Name}}", &RenderOptions::new())?;
    assert_eq!(compiled.source(), r#"Dear {{titleCase "x"}} {{titleCase Name}}"#);

    for (name, expected) in [("ada lovelace", "Dear X Ada Lovelace"), ("GRACE", "Dear X Grace")] {
        assert_eq!(compiled.render(&json!({"Name": name}))?, expected);
    }
    Ok(())
}
