//! Template rendering engine with Handlebars.
//!
//! This module provides the [`TemplateEngine`], which wraps Handlebars with the
//! mailbars helper set, legacy token rewriting and per-call partial isolation.
//!
//! Rendering is a two-pass pipeline:
//!
//! 1. **Rewrite**: legacy `%token%` syntax in the template (and in every
//!    partial) is rewritten into native mustache syntax.
//! 2. **Compile and evaluate**: the rewritten text is compiled by Handlebars
//!    and evaluated against the data in an environment scoped to the call.
//!
//! Only malformed templates produce errors. Formatting problems with the data
//! itself degrade inside the helpers and never abort a render.

use handlebars::{Context, RenderContext, RenderError, RenderErrorReason, Renderable, Template};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use super::environment::{Environments, RenderEnvironment};
use super::error::TemplateError;
use super::helpers::HelperRegistry;
use super::tokens;
use crate::constants::DEFAULT_LOCALE;

/// Partial bodies keyed by partial name, for a single render call.
pub type PartialSet = HashMap<String, String>;

/// Per-call options.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Partials visible to this call only.
    pub partials: Option<PartialSet>,
    /// Locale for helpers invoked without one; the engine default when `None`.
    pub locale: Option<String>,
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_partials(mut self, partials: PartialSet) -> Self {
        self.partials = Some(partials);
        self
    }

    pub fn with_partial(mut self, name: impl Into<String>, body: impl Into<String>) -> Self {
        self.partials.get_or_insert_with(PartialSet::new).insert(name.into(), body.into());
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }
}

/// Engine-wide settings.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Locale used when neither the call nor the helper names one.
    pub default_locale: String,
    /// Fail on references to missing data instead of rendering them empty.
    pub strict_mode: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_locale: DEFAULT_LOCALE.to_string(),
            strict_mode: false,
        }
    }
}

/// Template engine with the fixed helper set.
///
/// Cheap to clone; clones share the helper set and the base environment. The
/// engine is `Send + Sync` and may render from any number of threads at once.
///
/// # Examples
///
/// ```rust,no_run
/// use mailbars::templating::{RenderOptions, TemplateEngine};
/// use serde_json::json;
///
/// # fn example() -> Result<(), mailbars::templating::TemplateError> {
/// let engine = TemplateEngine::default();
/// let html = engine.render(
///     "Hi {{Name}}, you owe %currency:19.99%.",
///     &json!({"Name": "Ada"}),
///     &RenderOptions::new(),
/// )?;
/// assert_eq!(html, "Hi Ada, you owe $19.99.");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct TemplateEngine {
    environments: Arc<Environments>,
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new(HelperRegistry::standard(), EngineConfig::default())
    }
}

impl std::fmt::Debug for TemplateEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateEngine")
            .field("helpers", self.environments.helpers())
            .field("default_locale", &self.environments.default_locale())
            .finish()
    }
}

impl TemplateEngine {
    /// Create an engine around a helper registry.
    ///
    /// The base environment is built here, once; nothing mutates it afterwards.
    pub fn new(helpers: HelperRegistry, config: EngineConfig) -> Self {
        tracing::debug!(
            "Creating template engine (default locale {}, strict mode {})",
            config.default_locale,
            config.strict_mode
        );
        Self {
            environments: Arc::new(Environments::new(
                Arc::new(helpers),
                &config.default_locale,
                config.strict_mode,
            )),
        }
    }

    pub fn helpers(&self) -> &HelperRegistry {
        self.environments.helpers()
    }

    pub fn default_locale(&self) -> &str {
        self.environments.default_locale()
    }

    /// Whether `text` needs the engine at all.
    pub fn contains_template_syntax(text: &str) -> bool {
        tokens::contains_template_syntax(text)
    }

    /// Rewrite and compile `text` in an environment for `options`.
    ///
    /// # Errors
    ///
    /// - [`TemplateError::Syntax`] if the rewritten text does not compile
    /// - [`TemplateError::PartialSyntax`] if a supplied partial does not compile
    pub fn compile(&self, text: &str, options: &RenderOptions) -> Result<CompiledTemplate, TemplateError> {
        let source = tokens::transform(text).into_owned();
        let template = Template::compile(&source).map_err(|e| TemplateError::Syntax {
            message: e.to_string(),
        })?;

        let environment =
            self.environments.acquire(options.partials.as_ref(), options.locale.as_deref())?;

        Ok(CompiledTemplate {
            source,
            template,
            environment,
            environments: Arc::clone(&self.environments),
        })
    }

    /// Compile and evaluate `text` against `data` in one step.
    ///
    /// Text without any template syntax is returned unchanged without
    /// touching the engine.
    pub fn render(&self, text: &str, data: &Value, options: &RenderOptions) -> Result<String, TemplateError> {
        if !Self::contains_template_syntax(text) {
            return Ok(text.to_string());
        }
        self.compile(text, options)?.render(data)
    }
}

/// A parsed template bound to the environment it will render in.
///
/// The text is parsed once, in [`TemplateEngine::compile`]. Rendering does not
/// mutate anything, so one compiled template can render many data models,
/// concurrently if needed.
pub struct CompiledTemplate {
    source: String,
    template: Template,
    environment: RenderEnvironment,
    environments: Arc<Environments>,
}

impl CompiledTemplate {
    /// The template text after legacy token rewriting.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn environment(&self) -> &RenderEnvironment {
        &self.environment
    }

    /// Evaluate the template against `data`.
    ///
    /// # Errors
    ///
    /// [`TemplateError::Evaluation`] when Handlebars rejects the template,
    /// e.g. it calls a helper that is not registered. No partial output is
    /// returned.
    pub fn render(&self, data: &Value) -> Result<String, TemplateError> {
        let registry = self.environment.registry();
        let context = Context::wraps(data).map_err(|e| self.evaluation_error(&e))?;
        let mut render_context = RenderContext::new(None);
        self.template
            .renders(registry, &context, &mut render_context)
            .map_err(|e| self.evaluation_error(&e))
    }

    fn evaluation_error(&self, err: &RenderError) -> TemplateError {
        let suggestion = match err.reason() {
            RenderErrorReason::HelperNotFound(name) => self.environments.helpers().suggest(name),
            _ => None,
        };
        tracing::debug!("Template evaluation failed: {}", err);
        TemplateError::Evaluation {
            message: err.to_string(),
            suggestion,
        }
    }
}
