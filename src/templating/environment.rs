//! Per-call render environments.
//!
//! A render environment is a Handlebars registry with the helper set bound and,
//! optionally, a set of partials. Environments come in two scopes:
//!
//! - **Shared**: one base registry built at engine construction, bound to the
//!   engine's default locale and carrying no partials. Calls that add nothing
//!   use it directly. It is never mutated after construction, so any number of
//!   threads can render through it at once.
//! - **Call-scoped**: a fresh registry built for a single call that supplies
//!   partials or a non-default locale. The helpers are re-bound onto it and the
//!   call's partials registered. It is dropped with the call, so a partial named
//!   `footer` in one call can never be seen by another.

use handlebars::Handlebars;
use std::sync::Arc;

use super::error::TemplateError;
use super::helpers::HelperRegistry;
use super::locale;
use super::renderer::PartialSet;
use super::tokens;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvironmentScope {
    Shared,
    CallScoped,
}

/// A registry ready to render one call.
#[derive(Clone)]
pub struct RenderEnvironment {
    registry: Arc<Handlebars<'static>>,
    scope: EnvironmentScope,
}

impl RenderEnvironment {
    pub fn scope(&self) -> EnvironmentScope {
        self.scope
    }

    pub fn has_partial(&self, name: &str) -> bool {
        self.registry.has_template(name)
    }

    pub(crate) fn registry(&self) -> &Handlebars<'static> {
        &self.registry
    }
}

/// Hands out environments; owns the shared base.
pub(crate) struct Environments {
    base: RenderEnvironment,
    helpers: Arc<HelperRegistry>,
    default_locale: String,
    strict_mode: bool,
}

impl Environments {
    pub(crate) fn new(helpers: Arc<HelperRegistry>, default_locale: &str, strict_mode: bool) -> Self {
        let registry = build_registry(&helpers, default_locale, strict_mode);
        Self {
            base: RenderEnvironment {
                registry: Arc::new(registry),
                scope: EnvironmentScope::Shared,
            },
            helpers,
            default_locale: default_locale.to_string(),
            strict_mode,
        }
    }

    pub(crate) fn helpers(&self) -> &HelperRegistry {
        &self.helpers
    }

    pub(crate) fn default_locale(&self) -> &str {
        &self.default_locale
    }

    pub(crate) fn shared(&self) -> RenderEnvironment {
        self.base.clone()
    }

    /// Environment for one call.
    ///
    /// Partial bodies go through the legacy token rewrite before they are
    /// registered. A partial that fails to compile fails the whole call.
    pub(crate) fn acquire(
        &self,
        partials: Option<&PartialSet>,
        locale_id: Option<&str>,
    ) -> Result<RenderEnvironment, TemplateError> {
        let partials = partials.filter(|set| !set.is_empty());
        let locale_id = locale_id.filter(|id| !self.is_default_locale(id));

        if partials.is_none() && locale_id.is_none() {
            tracing::trace!("Rendering with shared environment");
            return Ok(self.shared());
        }

        let call_locale = locale_id.unwrap_or(&self.default_locale);
        let mut registry = build_registry(&self.helpers, call_locale, self.strict_mode);

        if let Some(partials) = partials {
            for (name, body) in partials {
                let body = tokens::transform(body);
                registry.register_partial(name, body.as_ref()).map_err(|e| {
                    TemplateError::PartialSyntax {
                        name: name.clone(),
                        message: e.to_string(),
                    }
                })?;
            }
        }

        tracing::trace!(
            "Rendering with call-scoped environment ({} partial(s), locale {})",
            partials.map_or(0, |set| set.len()),
            call_locale
        );

        Ok(RenderEnvironment {
            registry: Arc::new(registry),
            scope: EnvironmentScope::CallScoped,
        })
    }

    fn is_default_locale(&self, locale_id: &str) -> bool {
        locale_id.trim().is_empty()
            || locale::resolve(locale_id) == locale::resolve(&self.default_locale)
    }
}

fn build_registry(helpers: &HelperRegistry, locale_id: &str, strict_mode: bool) -> Handlebars<'static> {
    let mut registry = Handlebars::new();
    registry.set_strict_mode(strict_mode);
    helpers.bind(&mut registry, locale_id);
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    fn environments() -> Environments {
        Environments::new(Arc::new(HelperRegistry::standard()), "en-US", false)
    }

    #[test]
    fn test_shared_when_nothing_added() {
        let envs = environments();
        assert_eq!(envs.acquire(None, None).unwrap().scope(), EnvironmentScope::Shared);
        assert_eq!(
            envs.acquire(Some(&PartialSet::new()), Some("en-US")).unwrap().scope(),
            EnvironmentScope::Shared
        );
        assert_eq!(envs.acquire(None, Some("EN_us")).unwrap().scope(), EnvironmentScope::Shared);
    }

    #[test]
    fn test_call_scoped_for_partials_or_locale() {
        let envs = environments();
        let partials = PartialSet::from([("footer".to_string(), "%year% Co".to_string())]);

        let env = envs.acquire(Some(&partials), None).unwrap();
        assert_eq!(env.scope(), EnvironmentScope::CallScoped);
        assert!(env.has_partial("footer"));

        let env = envs.acquire(None, Some("de-DE")).unwrap();
        assert_eq!(env.scope(), EnvironmentScope::CallScoped);
    }

    #[test]
    fn test_base_is_never_mutated() {
        let envs = environments();
        let partials = PartialSet::from([("footer".to_string(), "A".to_string())]);
        let _scoped = envs.acquire(Some(&partials), None).unwrap();

        assert!(!envs.shared().has_partial("footer"));
    }

    #[test]
    fn test_broken_partial_is_reported_by_name() {
        let envs = environments();
        let partials = PartialSet::from([("broken".to_string(), "{{#if x}}open{{/each}}".to_string())]);

        match envs.acquire(Some(&partials), None) {
            Err(TemplateError::PartialSyntax {
                name,
                ..
            }) => assert_eq!(name, "broken"),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("broken partial should not compile"),
        }
    }
}
