//! Email templating engine for mailbars.
//!
//! This module renders HTML email bodies and subjects from Handlebars
//! templates, with locale-aware formatting helpers, a legacy `%token%` syntax
//! and partials that are visible only to the render call that supplied them.
//!
//! # Overview
//!
//! A render call takes template text, a JSON data model and [`RenderOptions`]
//! (an optional partial set and an optional locale) and produces a string:
//!
//! 1. [`tokens::transform`] rewrites legacy tokens in the template and in every
//!    partial (`%year%` → `{{year}}`, `%currency:19.99%` → `{{currency "19.99"}}`).
//! 2. [`environment`] picks the shared base environment or builds one scoped to
//!    the call, with the [`HelperRegistry`] bound and the partials registered.
//! 3. Handlebars compiles the rewritten text and evaluates it against the data.
//!
//! # Syntax
//!
//! - Variables: `{{Name}}`, `{{order.total}}`, or the legacy `%Name%`
//! - Helpers: `{{formatDate OrderDate "MMMM d, yyyy" "en-US"}}`, `%currency:19.99%`
//! - Blocks: `{{#gt Total 1000}}VIP{{else}}Regular{{/gt}}`
//! - Partials: `{{> footer}}`
//! - Unescaped output: `{{{Html}}}` or `{{safeHtml Html}}`
//!
//! # Escaping
//!
//! Interpolated values and helper output are HTML-escaped unless the helper
//! explicitly writes safe output (`safeHtml`, `htmlEncode` and the case helpers,
//! which escape on their own). `safeHtml` trusts its input; sanitizing it is the
//! caller's job.
//!
//! # Errors
//!
//! Only malformed templates fail a render, with a [`TemplateError`]. Unknown
//! locales fall back to invariant formatting, and values that do not parse as
//! dates or numbers are written as-is.
//!
//! # Example
//!
//! ```rust,no_run
//! use mailbars::templating::{RenderOptions, TemplateEngine};
//! use serde_json::json;
//!
//! # fn example() -> Result<(), mailbars::templating::TemplateError> {
//! let engine = TemplateEngine::default();
//! let options = RenderOptions::new()
//!     .with_partial("footer", "&copy; %year% Acme")
//!     .with_locale("de-DE");
//!
//! let html = engine.render(
//!     "<p>Summe: {{currency Total}}</p>{{> footer}}",
//!     &json!({"Total": 1234.5}),
//!     &options,
//! )?;
//! # Ok(())
//! # }
//! ```

pub mod environment;
pub mod error;
pub mod helpers;
pub mod locale;
pub mod renderer;
pub mod tokens;
pub mod value;


pub use environment::{EnvironmentScope, RenderEnvironment};
pub use error::TemplateError;
pub use helpers::{CatalogEntry, HelperCategory, HelperRegistry};
pub use locale::LocaleProfile;
pub use renderer::{CompiledTemplate, EngineConfig, PartialSet, RenderOptions, TemplateEngine};
pub use tokens::{contains_template_syntax, transform};
