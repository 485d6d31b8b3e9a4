//! Global configuration management for mailbars.
//!
//! The global configuration file (`~/.mailbars/config.toml`) holds user-wide
//! settings: where the template store lives, the default locale for helpers,
//! the envelope sender for delivered mail and the constant helpers bound at
//! start-up.
//!
//! # Configuration File Location
//!
//! Resolution order:
//!
//! 1. `--config <PATH>` on the command line
//! 2. The `MAILBARS_CONFIG` environment variable
//! 3. `~/.mailbars/config.toml` (`%LOCALAPPDATA%\mailbars\config.toml` on Windows)
//!
//! A missing file is not an error; defaults are used instead.
//!
//! # File Format
//!
//! ```toml
//! store_dir = "/srv/mail/templates"
//! default_locale = "de-DE"
//! strict_mode = false
//!
//! [sender]
//! from_email = "noreply@acme.test"
//! from_name = "Acme"
//!
//! [constants]
//! Company = "Acme Corporation"
//! SupportEmail = "support@acme.test"
//! ```
//!
//! # Examples
//!
//! ```rust,no_run
//! use mailbars::config::GlobalConfig;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = GlobalConfig::load_with_optional(None).await?;
//! let engine = config.engine()?;
//! println!("Default locale: {}", engine.default_locale());
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::constants::{CONFIG_PATH_ENV, DEFAULT_LOCALE};
use crate::core::MailbarsError;
use crate::templating::{EngineConfig, HelperRegistry, TemplateEngine};

fn default_locale() -> String {
    DEFAULT_LOCALE.to_string()
}

fn is_default_locale(locale: &str) -> bool {
    locale == DEFAULT_LOCALE
}

const fn is_false(value: &bool) -> bool {
    !*value
}

/// Envelope sender used by the delivery collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SenderConfig {
    #[serde(default = "default_from_email")]
    pub from_email: String,
    #[serde(default = "default_from_name")]
    pub from_name: String,
}

fn default_from_email() -> String {
    "noreply@example.com".to_string()
}

fn default_from_name() -> String {
    "Mailbars".to_string()
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            from_email: default_from_email(),
            from_name: default_from_name(),
        }
    }
}

fn is_default_sender(sender: &SenderConfig) -> bool {
    *sender == SenderConfig::default()
}

/// Global configuration structure for mailbars.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GlobalConfig {
    /// Root of the directory-backed template store.
    ///
    /// Defaults to `~/.mailbars/store` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_dir: Option<PathBuf>,

    /// Locale used by helpers invoked without one.
    #[serde(default = "default_locale", skip_serializing_if = "is_default_locale")]
    pub default_locale: String,

    /// Fail on references to missing data instead of rendering them empty.
    #[serde(default, skip_serializing_if = "is_false")]
    pub strict_mode: bool,

    #[serde(default, skip_serializing_if = "is_default_sender")]
    pub sender: SenderConfig,

    /// Constant value helpers, e.g. `Company = "Acme"` makes `%Company%` render "Acme".
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub constants: BTreeMap<String, String>,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            store_dir: None,
            default_locale: default_locale(),
            strict_mode: false,
            sender: SenderConfig::default(),
            constants: BTreeMap::new(),
        }
    }
}

impl GlobalConfig {
    /// Load global configuration from an optional path.
    ///
    /// If no path is given, `MAILBARS_CONFIG` and then the default location
    /// are tried. A missing file yields the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read, or contains
    /// invalid TOML.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        let path = Self::resolve_path(path)?;
        if path.exists() {
            Self::load_from(&path).await
        } else {
            tracing::debug!("No config file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load global configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or its TOML does not match
    /// the expected schema.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read global config from {}", path.display()))?;

        let config: Self = toml::from_str(&content).map_err(|e| MailbarsError::ConfigError {
            file: path.display().to_string(),
            reason: e.message().to_string(),
        })?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save global configuration to a specific file path.
    ///
    /// Parent directories are created as needed. On Unix the file is
    /// restricted to owner read/write.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails.
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize global config")?;

        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write global config to {}", path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            let mut perms = fs::metadata(path)
                .await
                .with_context(|| format!("Failed to read permissions for {}", path.display()))?
                .permissions();
            perms.set_mode(0o600);
            fs::set_permissions(path, perms).await.with_context(|| {
                format!("Failed to set permissions on {}", path.display())
            })?;
        }

        Ok(())
    }

    /// Directory holding the config file and the default store.
    ///
    /// # Errors
    ///
    /// Returns an error if the home (or local data) directory cannot be determined.
    pub fn config_dir() -> Result<PathBuf> {
        let dir = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine local data directory"))?
                .join("mailbars")
        } else {
            dirs::home_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?
                .join(".mailbars")
        };
        Ok(dir)
    }

    /// Get the default file path for global configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn default_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Resolve the config file path: explicit path, then `MAILBARS_CONFIG`, then the default.
    ///
    /// # Errors
    ///
    /// Returns an error if no explicit path is given and the default cannot be determined.
    pub fn resolve_path(path: Option<PathBuf>) -> Result<PathBuf> {
        if let Some(path) = path {
            return Ok(path);
        }
        match std::env::var_os(CONFIG_PATH_ENV) {
            Some(value) if !value.is_empty() => Ok(PathBuf::from(value)),
            _ => Self::default_path(),
        }
    }

    /// Root of the template store, falling back to `~/.mailbars/store`.
    ///
    /// # Errors
    ///
    /// Returns an error if no store directory is configured and the home
    /// directory cannot be determined.
    pub fn store_dir(&self) -> Result<PathBuf> {
        match &self.store_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(Self::config_dir()?.join("store")),
        }
    }

    /// Build the helper registry with the configured constants.
    ///
    /// # Errors
    ///
    /// Returns an error if a constant name is invalid or shadows a built-in helper.
    pub fn helper_registry(&self) -> Result<HelperRegistry> {
        HelperRegistry::with_constants(
            self.constants.iter().map(|(name, value)| (name.as_str(), value.as_str())),
        )
        .context("Invalid [constants] table in global config")
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            default_locale: self.default_locale.clone(),
            strict_mode: self.strict_mode,
        }
    }

    /// Build a template engine from this configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the constant helpers cannot be registered.
    pub fn engine(&self) -> Result<TemplateEngine> {
        Ok(TemplateEngine::new(self.helper_registry()?, self.engine_config()))
    }

    /// Example configuration written by `mailbars config init`.
    #[must_use]
    pub fn init_example() -> Self {
        let mut constants = BTreeMap::new();
        constants.insert("Company".to_string(), "Acme Corporation".to_string());
        constants.insert("SupportEmail".to_string(), "support@acme.test".to_string());

        Self {
            sender: SenderConfig {
                from_email: "noreply@acme.test".to_string(),
                from_name: "Acme Corporation".to_string(),
            },
            constants,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_global_config_default() {
        let config = GlobalConfig::default();
        assert_eq!(config.default_locale, "en-US");
        assert!(config.constants.is_empty());
        assert!(!config.strict_mode);
    }

    #[tokio::test]
    async fn test_global_config_save_load() -> Result<()> {
        let temp = TempDir::new()?;
        let config_path = temp.path().join("nested").join("config.toml");

        let mut config = GlobalConfig::init_example();
        config.default_locale = "fr-FR".to_string();
        config.store_dir = Some(temp.path().join("store"));
        config.save_to(&config_path).await?;

        let loaded = GlobalConfig::load_from(&config_path).await?;
        assert_eq!(loaded, config);
        assert_eq!(loaded.store_dir()?, temp.path().join("store"));
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_file_yields_defaults() -> Result<()> {
        let temp = TempDir::new()?;
        let config = GlobalConfig::load_with_optional(Some(temp.path().join("none.toml"))).await?;
        assert_eq!(config, GlobalConfig::default());
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_toml_is_config_error() -> Result<()> {
        let temp = TempDir::new()?;
        let path = temp.path().join("config.toml");
        tokio::fs::write(&path, "default_locale = [").await?;

        let err = GlobalConfig::load_from(&path).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MailbarsError>(),
            Some(MailbarsError::ConfigError { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_constants_become_helpers() -> Result<()> {
        let config: GlobalConfig = toml::from_str(
            r#"
default_locale = "de-DE"

[constants]
Company = "Acme"
"#,
        )?;
        let engine = config.engine()?;
        let html = engine.render(
            "%Company%: {{formatNumber 1234.5}}",
            &json!({}),
            &crate::templating::RenderOptions::new(),
        )?;
        assert_eq!(html, "Acme: 1.234,50");
        Ok(())
    }

    #[test]
    fn test_constant_shadowing_builtin_is_rejected() {
        let mut config = GlobalConfig::default();
        config.constants.insert("currency".to_string(), "x".to_string());
        assert!(config.helper_registry().is_err());
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn test_config_file_permissions() -> Result<()> {
        use std::os::unix::fs::PermissionsExt;
        let temp_dir = tempfile::tempdir()?;
        let config_path = temp_dir.path().join("test-config.toml");

        GlobalConfig::default().save_to(&config_path).await?;

        let mode = tokio::fs::metadata(&config_path).await?.permissions().mode() & 0o777;
        assert_eq!(mode, 0o600, "Config file should have 600 permissions");
        Ok(())
    }
}
