//! mailbars - Handlebars email templates with locale-aware helpers
//!
//! mailbars renders HTML email subjects and bodies from Handlebars templates.
//! It adds a fixed set of formatting helpers (dates, numbers, currency, text
//! casing, comparisons), a legacy `%token%` syntax that is rewritten to native
//! mustache syntax before compilation, and partials that are visible only to
//! the render call that supplied them.
//!
//! # Architecture Overview
//!
//! The template engine is a pure string-to-string transformation: it never
//! reads storage and never sends mail. Around it sit three collaborators:
//!
//! - a [`store::TemplateStore`] that holds templates, partials and attachments
//! - a [`mail::Mailer`] that delivers rendered messages
//! - the [`service::TemplateService`] that looks a template up, renders its
//!   subject and body with the store's partials, and hands the result to the mailer
//!
//! # Core Modules
//!
//! - [`templating`] - Token rewriting, helpers, locale profiles and the render engine
//! - [`store`] - In-memory and directory-backed template stores
//! - [`mail`] - Email messages and the console (simulated) mailer
//! - [`service`] - Render-and-deliver application service
//! - [`config`] - Global configuration (`~/.mailbars/config.toml`)
//! - [`core`] - Application error type and user-friendly error reporting
//! - [`cli`] - Command-line interface
//! - [`constants`] - Shared defaults
//!
//! # Example
//!
//! ```rust,no_run
//! use mailbars::templating::{RenderOptions, TemplateEngine};
//! use serde_json::json;
//!
//! # fn main() -> Result<(), mailbars::templating::TemplateError> {
//! let engine = TemplateEngine::default();
//! let html = engine.render(
//!     "<p>Hi {{titleCase Name}}, your order of %currency:1234.5% ships {{formatDate Ship \"D\"}}.</p>",
//!     &json!({"Name": "ada lovelace", "Ship": "2024-03-05"}),
//!     &RenderOptions::new().with_locale("en-GB"),
//! )?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod mail;
pub mod service;
pub mod store;
pub mod templating;

// test_utils is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
