//! Per-call partials and locales must never leak between renders.

use anyhow::Result;
use mailbars::templating::{EnvironmentScope, RenderOptions, TemplateEngine};
use serde_json::json;
use tokio::task::JoinSet;

const LOCALES: [(&str, &str); 4] = [
    ("en-US", "$1,234.50"),
    ("en-GB", "£1,234.50"),
    ("de-DE", "1.234,50\u{a0}€"),
    ("ja-JP", "￥1,235"),
];

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_partials_do_not_leak() -> Result<()> {
    let engine = TemplateEngine::default();
    let mut tasks = JoinSet::new();

    for i in 0..64 {
        let engine = engine.clone();
        tasks.spawn_blocking(move || {
            let signature = format!("sig-{i}");
            let options = RenderOptions::new().with_partial("signature", signature.clone());
            let html = engine.render("<p>{{> signature}}</p>", &json!({}), &options);
            (signature, html)
        });
    }

    while let Some(joined) = tasks.join_next().await {
        let (signature, html) = joined?;
        assert_eq!(html?, format!("<p>{signature}</p>"));
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_locales_do_not_leak() -> Result<()> {
    let engine = TemplateEngine::default();
    let mut tasks = JoinSet::new();

    for i in 0..64 {
        let engine = engine.clone();
        let (locale, expected) = LOCALES[i % LOCALES.len()];
        tasks.spawn_blocking(move || {
            let options = RenderOptions::new().with_locale(locale);
            let html = engine.render("{{currency Total}}", &json!({"Total": 1234.5}), &options);
            (locale, expected, html)
        });
    }

    while let Some(joined) = tasks.join_next().await {
        let (locale, expected, html) = joined?;
        assert_eq!(html?, expected, "locale {locale}");
    }
    Ok(())
}

#[test]
fn test_partials_are_not_visible_to_later_calls() -> Result<()> {
    let engine = TemplateEngine::default();

    let with_partial = RenderOptions::new().with_partial("banner", "SALE");
    assert_eq!(engine.render("{{> banner}}", &json!({}), &with_partial)?, "SALE");

    let without = engine.compile("{{> banner}}", &RenderOptions::new())?;
    assert_eq!(without.environment().scope(), EnvironmentScope::Shared);
    assert!(!without.environment().has_partial("banner"));
    Ok(())
}

#[test]
fn test_call_scoped_environment_only_when_needed() -> Result<()> {
    let engine = TemplateEngine::default();

    let shared = engine.compile("{{year}}", &RenderOptions::new().with_locale("en-US"))?;
    assert_eq!(shared.environment().scope(), EnvironmentScope::Shared);

    let scoped = engine.compile("{{year}}", &RenderOptions::new().with_locale("fr-FR"))?;
    assert_eq!(scoped.environment().scope(), EnvironmentScope::CallScoped);

    let with_partial = engine.compile("{{> p}}", &RenderOptions::new().with_partial("p", "x"))?;
    assert_eq!(with_partial.environment().scope(), EnvironmentScope::CallScoped);
    assert!(with_partial.environment().has_partial("p"));
    Ok(())
}
