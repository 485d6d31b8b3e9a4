//! Helper registry for mailbars templates.
//!
//! Helpers come in two shapes:
//!
//! - **Value helpers** format their arguments and write text. Output is either
//!   escaped by the engine's default interpolation rule or, for helpers that
//!   intentionally emit markup (or escape on their own), written verbatim.
//! - **Block helpers** evaluate a predicate over their arguments and render
//!   exactly one of the primary or `{{else}}` branch.
//!
//! The registry itself is immutable configuration. It is built once, usually
//! from [`HelperRegistry::standard`] plus the `[constants]` table of the global
//! config, and then [`bound`](HelperRegistry::bind) onto every Handlebars
//! environment the engine creates. Binding carries a default locale, which is
//! what locale-aware helpers use when the template passes none.
//!
//! # Built-in Helpers
//!
//! | Helper | Arguments | Output |
//! |---|---|---|
//! | `year` | `[locale?]` | current year |
//! | `currentDate` | `[format?, locale?]` | current date, default `yyyy-MM-dd` |
//! | `formatDate` | `value, [format?, locale?]` | formatted date, or `value` unchanged |
//! | `formatNumber` | `value, [format?, locale?]` | formatted number, default `N2` |
//! | `currency` | `value, [locale?]` | locale currency, `$0.00` without arguments |
//! | `percentage` | `value, [locale?]` | locale percentage of a fraction |
//! | `uppercase` / `lowercase` / `titleCase` | `value, [locale?]` | case-mapped, HTML-escaped |
//! | `htmlEncode` | `value` | HTML-escaped |
//! | `urlEncode` | `value` | percent-encoded |
//! | `safeHtml` | `value` | verbatim, never escaped |
//! | `#ifNotEmpty` | `value` | block |
//! | `#eq` / `#neq` | `a, b` | block, string comparison |
//! | `#gt` / `#lt` | `a, b` | block, decimal comparison |
//!
//! Every locale-aware helper also accepts a `locale="de-DE"` hash argument,
//! which wins over the positional locale.

mod dates;
mod logic;
mod numbers;
mod text;

use handlebars::{
    Context, Handlebars, Helper, HelperDef, HelperResult, Output, RenderContext, Renderable,
    ScopedJson,
};
use regex::Regex;
use serde_json::Value;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};
use strsim::levenshtein;

use super::error::TemplateError;
use super::locale::{self, LocaleProfile};
use super::value;
use crate::constants::{LOCALE_HASH_KEY, SIMILARITY_THRESHOLD_PERCENT};

pub use numbers::format_number;

static HELPER_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("helper name pattern is valid")
});

/// Arguments of one helper invocation.
pub struct HelperArgs<'a> {
    params: Vec<&'a Value>,
    locale_override: Option<&'a str>,
    default_locale: &'a str,
}

impl<'a> HelperArgs<'a> {
    pub fn new(params: Vec<&'a Value>, default_locale: &'a str) -> Self {
        Self {
            params,
            locale_override: None,
            default_locale,
        }
    }

    pub fn with_locale_override(mut self, locale: Option<&'a str>) -> Self {
        self.locale_override = locale;
        self
    }

    fn from_helper(h: &'a Helper<'_>, default_locale: &'a str) -> Self {
        let params = h.params().iter().map(|param| param.value()).collect();
        let locale_override = h.hash_get(LOCALE_HASH_KEY).and_then(|param| param.value().as_str());
        Self::new(params, default_locale).with_locale_override(locale_override)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&'a Value> {
        self.params.get(index).copied()
    }

    /// Text argument at `index`; null and absent are both `None`.
    pub fn text(&self, index: usize) -> Option<Cow<'a, str>> {
        self.get(index).and_then(value::to_text)
    }

    /// Text argument at `index`, treating blank text as absent.
    pub fn option(&self, index: usize) -> Option<Cow<'a, str>> {
        self.text(index).filter(|text| !text.trim().is_empty())
    }

    /// Profile for a helper whose positional locale argument sits at `index`.
    ///
    /// Precedence: `locale=` hash argument, positional argument, bound default.
    pub fn locale_at(&self, index: usize) -> &'static LocaleProfile {
        match self.locale_override {
            Some(tag) => locale::resolve(tag),
            None => match self.option(index) {
                Some(tag) => locale::resolve(&tag),
                None => locale::resolve(self.default_locale),
            },
        }
    }
}

/// What a value helper produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HelperOutput {
    /// Text the engine escapes like any other interpolation.
    Escaped(String),
    /// Text written verbatim.
    Safe(String),
    Empty,
}

impl HelperOutput {
    pub fn as_str(&self) -> &str {
        match self {
            HelperOutput::Escaped(text) | HelperOutput::Safe(text) => text,
            HelperOutput::Empty => "",
        }
    }
}

pub type ValueFn = fn(&HelperArgs<'_>) -> HelperOutput;
pub type PredicateFn = fn(&HelperArgs<'_>) -> bool;

#[derive(Clone, Copy)]
pub enum HelperKind {
    Value(ValueFn),
    Block(PredicateFn),
}

impl HelperKind {
    pub fn label(&self) -> &'static str {
        match self {
            HelperKind::Value(_) => "value",
            HelperKind::Block(_) => "block",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HelperCategory {
    DateTime,
    Number,
    Text,
    Logic,
    Partials,
    Constant,
}

impl std::fmt::Display for HelperCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            HelperCategory::DateTime => "Date/Time",
            HelperCategory::Number => "Number",
            HelperCategory::Text => "Text",
            HelperCategory::Logic => "Logic",
            HelperCategory::Partials => "Partials",
            HelperCategory::Constant => "Constant",
        };
        f.write_str(label)
    }
}

/// A built-in helper: implementation plus catalogue metadata.
#[derive(Clone, Copy)]
pub struct HelperSpec {
    pub name: &'static str,
    pub kind: HelperKind,
    pub category: HelperCategory,
    pub usage: &'static str,
    pub description: &'static str,
}

const BUILTINS: &[HelperSpec] = &[
    HelperSpec {
        name: "year",
        kind: HelperKind::Value(dates::year),
        category: HelperCategory::DateTime,
        usage: "{{year}} or %year%",
        description: "Current year",
    },
    HelperSpec {
        name: "currentDate",
        kind: HelperKind::Value(dates::current_date),
        category: HelperCategory::DateTime,
        usage: "{{currentDate \"MMM dd, yyyy\" \"en-US\"}}",
        description: "Current date in the given pattern and locale",
    },
    HelperSpec {
        name: "formatDate",
        kind: HelperKind::Value(dates::format_date),
        category: HelperCategory::DateTime,
        usage: "{{formatDate OrderDate \"D\" \"fr-FR\"}}",
        description: "Format a date value; unparseable input is written unchanged",
    },
    HelperSpec {
        name: "formatNumber",
        kind: HelperKind::Value(numbers::format_number_helper),
        category: HelperCategory::Number,
        usage: "{{formatNumber Quantity \"N0\" \"de-DE\"}}",
        description: "Format a number with a standard or custom numeric pattern",
    },
    HelperSpec {
        name: "currency",
        kind: HelperKind::Value(numbers::currency),
        category: HelperCategory::Number,
        usage: "{{currency Total \"en-GB\"}} or %currency:19.99%",
        description: "Format an amount as currency",
    },
    HelperSpec {
        name: "percentage",
        kind: HelperKind::Value(numbers::percentage),
        category: HelperCategory::Number,
        usage: "{{percentage Discount}}",
        description: "Format a fraction as a percentage (0.15 → 15.00%)",
    },
    HelperSpec {
        name: "uppercase",
        kind: HelperKind::Value(text::uppercase),
        category: HelperCategory::Text,
        usage: "{{uppercase Name}}",
        description: "Upper-case text using the locale's casing rules",
    },
    HelperSpec {
        name: "lowercase",
        kind: HelperKind::Value(text::lowercase),
        category: HelperCategory::Text,
        usage: "{{lowercase Email}}",
        description: "Lower-case text using the locale's casing rules",
    },
    HelperSpec {
        name: "titleCase",
        kind: HelperKind::Value(text::title_case),
        category: HelperCategory::Text,
        usage: "{{titleCase Name}}",
        description: "Capitalize the first letter of every word",
    },
    HelperSpec {
        name: "htmlEncode",
        kind: HelperKind::Value(text::html_encode),
        category: HelperCategory::Text,
        usage: "{{htmlEncode Comment}}",
        description: "Escape HTML special characters",
    },
    HelperSpec {
        name: "urlEncode",
        kind: HelperKind::Value(text::url_encode),
        category: HelperCategory::Text,
        usage: "<a href=\"https://example.com/?q={{urlEncode Query}}\">",
        description: "Percent-encode text for use in a URL",
    },
    HelperSpec {
        name: "safeHtml",
        kind: HelperKind::Value(text::safe_html),
        category: HelperCategory::Text,
        usage: "{{safeHtml Signature}}",
        description: "Write trusted markup verbatim, without escaping",
    },
    HelperSpec {
        name: "ifNotEmpty",
        kind: HelperKind::Block(logic::if_not_empty),
        category: HelperCategory::Logic,
        usage: "{{#ifNotEmpty Email}}...{{else}}...{{/ifNotEmpty}}",
        description: "Render the block when the value is neither null nor empty",
    },
    HelperSpec {
        name: "eq",
        kind: HelperKind::Block(logic::eq),
        category: HelperCategory::Logic,
        usage: "{{#eq Status \"active\"}}...{{else}}...{{/eq}}",
        description: "Render the block when both values are equal as text",
    },
    HelperSpec {
        name: "neq",
        kind: HelperKind::Block(logic::neq),
        category: HelperCategory::Logic,
        usage: "{{#neq Status \"active\"}}...{{/neq}}",
        description: "Render the block when the values differ as text",
    },
    HelperSpec {
        name: "gt",
        kind: HelperKind::Block(logic::gt),
        category: HelperCategory::Logic,
        usage: "{{#gt Total 1000}}...{{else}}...{{/gt}}",
        description: "Render the block when the first number is greater",
    },
    HelperSpec {
        name: "lt",
        kind: HelperKind::Block(logic::lt),
        category: HelperCategory::Logic,
        usage: "{{#lt Stock 5}}...{{/lt}}",
        description: "Render the block when the first number is smaller",
    },
];

/// One row of the helper catalogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: String,
    pub category: HelperCategory,
    pub kind: &'static str,
    pub usage: String,
    pub description: String,
}

/// The fixed helper set shared by every render.
#[derive(Clone)]
pub struct HelperRegistry {
    builtins: &'static [HelperSpec],
    constants: BTreeMap<String, Arc<str>>,
}

impl std::fmt::Debug for HelperRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HelperRegistry")
            .field("builtins", &self.builtins.iter().map(|spec| spec.name).collect::<Vec<_>>())
            .field("constants", &self.constants)
            .finish()
    }
}

impl Default for HelperRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl HelperRegistry {
    /// Registry with only the built-in helpers.
    pub fn standard() -> Self {
        Self {
            builtins: BUILTINS,
            constants: BTreeMap::new(),
        }
    }

    /// Registry with the built-ins plus constant value helpers.
    ///
    /// A constant named like a built-in, or with a name templates could not
    /// call, is rejected.
    pub fn with_constants<I, K, V>(constants: I) -> Result<Self, TemplateError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let mut registry = Self::standard();
        for (name, text) in constants {
            let name = name.into();
            if !HELPER_NAME.is_match(&name) {
                return Err(TemplateError::InvalidConstant {
                    name,
                    reason: "names must start with a letter or '_' and contain only letters, digits and '_'".to_string(),
                });
            }
            if registry.builtin(&name).is_some() {
                return Err(TemplateError::InvalidConstant {
                    name,
                    reason: "a built-in helper already uses this name".to_string(),
                });
            }
            registry.constants.insert(name, Arc::from(text.as_ref()));
        }
        Ok(registry)
    }

    pub fn builtin(&self, name: &str) -> Option<&HelperSpec> {
        self.builtins.iter().find(|spec| spec.name == name)
    }

    pub fn constant(&self, name: &str) -> Option<&str> {
        self.constants.get(name).map(|text| text.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.builtin(name).is_some() || self.constants.contains_key(name)
    }

    /// Every helper name, built-ins first.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.builtins.iter().map(|spec| spec.name).chain(self.constants.keys().map(String::as_str))
    }

    /// Register every helper on `hb`, with `default_locale` for helpers
    /// invoked without a locale.
    pub fn bind(&self, hb: &mut Handlebars<'static>, default_locale: &str) {
        let default_locale: Arc<str> = Arc::from(default_locale);

        for spec in self.builtins {
            match spec.kind {
                HelperKind::Value(run) => hb.register_helper(
                    spec.name,
                    Box::new(BoundValueHelper {
                        run,
                        default_locale: Arc::clone(&default_locale),
                    }),
                ),
                HelperKind::Block(predicate) => hb.register_helper(
                    spec.name,
                    Box::new(BoundBlockHelper {
                        predicate,
                        default_locale: Arc::clone(&default_locale),
                    }),
                ),
            }
        }

        for (name, text) in &self.constants {
            hb.register_helper(
                name,
                Box::new(ConstantHelper {
                    text: Arc::clone(text),
                }),
            );
        }
    }

    /// Closest helper name to `name`, if any is within the similarity threshold.
    pub fn suggest(&self, name: &str) -> Option<String> {
        let max_distance = (name.len() * SIMILARITY_THRESHOLD_PERCENT / 100).max(1);
        self.names()
            .filter(|candidate| *candidate != name)
            .map(|candidate| (levenshtein(name, candidate), candidate))
            .filter(|(distance, _)| *distance <= max_distance)
            .min_by_key(|(distance, _)| *distance)
            .map(|(_, candidate)| candidate.to_string())
    }

    /// Catalogue of built-in and constant helpers, plus partial syntax.
    pub fn catalog(&self) -> Vec<CatalogEntry> {
        let mut entries: Vec<CatalogEntry> = self
            .builtins
            .iter()
            .map(|spec| CatalogEntry {
                name: spec.name.to_string(),
                category: spec.category,
                kind: spec.kind.label(),
                usage: spec.usage.to_string(),
                description: spec.description.to_string(),
            })
            .collect();

        entries.push(CatalogEntry {
            name: ">".to_string(),
            category: HelperCategory::Partials,
            kind: "partial",
            usage: "{{> footer}}".to_string(),
            description: "Include a named partial".to_string(),
        });

        entries.extend(self.constants.iter().map(|(name, text)| CatalogEntry {
            name: name.clone(),
            category: HelperCategory::Constant,
            kind: "value",
            usage: format!("{{{{{name}}}}} or %{name}%"),
            description: format!("Constant \"{text}\""),
        }));

        entries
    }
}

/// Adapts a [`ValueFn`] to Handlebars.
struct BoundValueHelper {
    run: ValueFn,
    default_locale: Arc<str>,
}

impl HelperDef for BoundValueHelper {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'rc>, handlebars::RenderError> {
        let args = HelperArgs::from_helper(h, &self.default_locale);
        let result = match (self.run)(&args) {
            HelperOutput::Escaped(text) | HelperOutput::Safe(text) => Value::String(text),
            HelperOutput::Empty => Value::Null,
        };
        Ok(ScopedJson::Derived(result))
    }

    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        r: &'reg Handlebars<'reg>,
        _: &'rc Context,
        rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let args = HelperArgs::from_helper(h, &self.default_locale);
        match (self.run)(&args) {
            HelperOutput::Escaped(text) => {
                if rc.is_disable_escape() {
                    out.write(&text)?;
                } else {
                    out.write(&r.get_escape_fn()(&text))?;
                }
            }
            HelperOutput::Safe(text) => out.write(&text)?,
            HelperOutput::Empty => {}
        }
        Ok(())
    }
}

/// Adapts a [`PredicateFn`] to a Handlebars block helper.
struct BoundBlockHelper {
    predicate: PredicateFn,
    default_locale: Arc<str>,
}

impl HelperDef for BoundBlockHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        r: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let args = HelperArgs::from_helper(h, &self.default_locale);
        let branch = if (self.predicate)(&args) {
            h.template()
        } else {
            h.inverse()
        };
        match branch {
            Some(template) => template.render(r, ctx, rc, out),
            None => Ok(()),
        }
    }
}

struct ConstantHelper {
    text: Arc<str>,
}

impl HelperDef for ConstantHelper {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        _: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'rc>, handlebars::RenderError> {
        Ok(ScopedJson::Derived(Value::String(self.text.to_string())))
    }
}
