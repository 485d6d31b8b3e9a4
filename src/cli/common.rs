//! Common utilities for CLI commands

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;

use crate::config::GlobalConfig;
use crate::core::MailbarsError;
use crate::mail::ConsoleMailer;
use crate::service::TemplateService;
use crate::store::DirectoryStore;
use crate::templating::TemplateEngine;

/// Marker for "read from standard input" in path arguments.
const STDIN_MARKER: &str = "-";

/// Common context for CLI commands: the loaded configuration and the
/// resolved store location.
#[derive(Debug)]
pub struct CommandContext {
    pub config: GlobalConfig,
    /// Where the config was (or would be) loaded from
    pub config_path: PathBuf,
    /// Template store root, from `--store` or the config
    pub store_dir: PathBuf,
}

impl CommandContext {
    /// Load the global config and resolve the store directory.
    ///
    /// # Errors
    /// Returns an error if the config file exists but cannot be parsed
    pub async fn load(config_path: Option<PathBuf>, store: Option<PathBuf>) -> Result<Self> {
        let config_path = GlobalConfig::resolve_path(config_path)?;
        let config = GlobalConfig::load_with_optional(Some(config_path.clone())).await?;
        let store_dir = match store {
            Some(dir) => dir,
            None => config.store_dir()?,
        };
        tracing::debug!("Using store {} and config {}", store_dir.display(), config_path.display());

        Ok(Self {
            config,
            config_path,
            store_dir,
        })
    }

    /// Like [`CommandContext::load`], but an unreadable config falls back to
    /// defaults so it can be inspected or recreated.
    ///
    /// # Errors
    /// Returns an error if no config path can be determined
    pub async fn load_lenient(config_path: Option<PathBuf>, store: Option<PathBuf>) -> Result<Self> {
        let config_path = GlobalConfig::resolve_path(config_path)?;
        match Self::load(Some(config_path.clone()), store.clone()).await {
            Ok(ctx) => Ok(ctx),
            Err(e) => {
                tracing::warn!("Ignoring unreadable config {}: {e:#}", config_path.display());
                let config = GlobalConfig::default();
                let store_dir = match store {
                    Some(dir) => dir,
                    None => config.store_dir()?,
                };
                Ok(Self {
                    config,
                    config_path,
                    store_dir,
                })
            }
        }
    }

    /// Build a template engine from the config.
    ///
    /// # Errors
    /// Returns an error if the configured constants are invalid
    pub fn engine(&self) -> Result<TemplateEngine> {
        self.config.engine()
    }

    /// Open the template store.
    ///
    /// # Errors
    /// Returns [`MailbarsError::StoreNotFound`] if the store was never initialized
    pub fn open_store(&self) -> Result<DirectoryStore> {
        Ok(DirectoryStore::open(&self.store_dir)?)
    }

    /// Service over the directory store and the console mailer.
    ///
    /// # Errors
    /// Returns an error if the store or the engine cannot be set up
    pub fn service(&self) -> Result<TemplateService<DirectoryStore, ConsoleMailer>> {
        Ok(TemplateService::new(self.open_store()?, ConsoleMailer::new(), self.engine()?)
            .with_sender(self.config.sender.clone()))
    }
}

/// Read a template data model.
///
/// No source is an empty object; `-` reads standard input. Files ending in
/// `.yaml` / `.yml` are parsed as YAML, everything else as JSON.
///
/// # Errors
/// Returns an error if the source cannot be read or parsed
pub async fn read_data(source: Option<&Path>) -> Result<Value> {
    let Some(source) = source else {
        return Ok(Value::Object(serde_json::Map::new()));
    };

    let content = read_source(source).await?;
    let is_yaml = source
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    let data = if is_yaml {
        serde_yaml::from_str(&content).map_err(|e| MailbarsError::InvalidData {
            reason: format!("{}: {e}", source.display()),
        })?
    } else {
        serde_json::from_str(&content).map_err(|e| MailbarsError::InvalidData {
            reason: format!("{}: {e}", source.display()),
        })?
    };
    Ok(data)
}

/// Read a file, or standard input for `-`.
///
/// # Errors
/// Returns an error if the file or standard input cannot be read
pub async fn read_source(source: &Path) -> Result<String> {
    if is_stdin(source) {
        let mut content = String::new();
        tokio::io::stdin()
            .read_to_string(&mut content)
            .await
            .context("Failed to read standard input")?;
        return Ok(content);
    }
    tokio::fs::read_to_string(source)
        .await
        .with_context(|| format!("Failed to read {}", source.display()))
}

pub fn is_stdin(source: &Path) -> bool {
    source == Path::new(STDIN_MARKER)
}

/// Fail when more than one of `sources` would read standard input.
pub fn ensure_single_stdin<'a>(
    sources: impl IntoIterator<Item = (&'static str, Option<&'a Path>)>,
) -> Result<()> {
    let readers: Vec<&str> = sources
        .into_iter()
        .filter(|(_, source)| source.is_some_and(is_stdin))
        .map(|(argument, _)| argument)
        .collect();
    if readers.len() > 1 {
        anyhow::bail!(
            "{} cannot all read standard input; give '{STDIN_MARKER}' to only one of them",
            readers.join(" and ")
        );
    }
    Ok(())
}

/// Parse a `NAME=FILE` argument.
pub fn parse_name_file(arg: &str) -> Result<(String, PathBuf), String> {
    match arg.split_once('=') {
        Some((name, file)) if !name.trim().is_empty() && !file.trim().is_empty() => {
            Ok((name.trim().to_string(), PathBuf::from(file.trim())))
        }
        _ => Err(format!("expected NAME=FILE, got '{arg}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_parse_name_file() {
        assert_eq!(
            parse_name_file("footer=parts/footer.hbs"),
            Ok(("footer".to_string(), PathBuf::from("parts/footer.hbs")))
        );
        assert!(parse_name_file("footer").is_err());
        assert!(parse_name_file("=x").is_err());
        assert!(parse_name_file("x=").is_err());
    }

    #[tokio::test]
    async fn test_read_data_formats() -> Result<()> {
        let temp = TempDir::new()?;
        let json_path = temp.path().join("data.json");
        std::fs::write(&json_path, r#"{"Name": "Ada"}"#)?;
        let yaml_path = temp.path().join("data.yml");
        std::fs::write(&yaml_path, "Name: Ada\nTotal: 5\n")?;

        assert_eq!(read_data(None).await?, json!({}));
        assert_eq!(read_data(Some(&json_path)).await?, json!({"Name": "Ada"}));
        assert_eq!(read_data(Some(&yaml_path)).await?, json!({"Name": "Ada", "Total": 5}));
        Ok(())
    }

    #[tokio::test]
    async fn test_read_data_invalid_json() -> Result<()> {
        let temp = TempDir::new()?;
        let path = temp.path().join("data.json");
        std::fs::write(&path, "{not json")?;
        let err = read_data(Some(&path)).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<MailbarsError>(), Some(MailbarsError::InvalidData { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_read_source_reports_missing_file() {
        let err = read_source(Path::new("does/not/exist.hbs")).await.unwrap_err();
        assert!(err.to_string().contains("does/not/exist.hbs"));
    }

    #[test]
    fn test_ensure_single_stdin() {
        let stdin = Path::new("-");
        let file = Path::new("data.json");
        assert!(ensure_single_stdin([("TEXT", Some(stdin)), ("--data", Some(file))]).is_ok());
        assert!(ensure_single_stdin([("TEXT", Some(file)), ("--data", None)]).is_ok());

        let err = ensure_single_stdin([("TEXT", Some(stdin)), ("--data", Some(stdin))]).unwrap_err();
        assert!(err.to_string().contains("TEXT and --data"), "{err}");
    }

    #[tokio::test]
    async fn test_context_prefers_store_flag() -> Result<()> {
        let temp = TempDir::new()?;
        let ctx = CommandContext::load(
            Some(temp.path().join("config.toml")),
            Some(temp.path().join("elsewhere")),
        )
        .await?;
        assert_eq!(ctx.store_dir, temp.path().join("elsewhere"));
        assert!(ctx.open_store().is_err());
        Ok(())
    }
}
