//! Isolated test environment with a config file and a template store.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::config::GlobalConfig;
use crate::store::DirectoryStore;

/// A temporary directory laid out like a user's mailbars setup:
///
/// ```text
/// <temp>/
/// ├── config.toml
/// └── store/
/// ```
///
/// Everything is deleted when the environment is dropped.
pub struct TestEnvironment {
    temp_dir: TempDir,
}

impl TestEnvironment {
    /// An empty environment: no config file, no store.
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new().context("Failed to create temp dir")?;
        Ok(Self {
            temp_dir,
        })
    }

    /// An environment with a seeded store and no config file.
    pub async fn seeded() -> Result<Self> {
        let env = Self::new()?;
        DirectoryStore::init(env.store_path(), false).await?;
        Ok(env)
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.path().join("config.toml")
    }

    pub fn store_path(&self) -> PathBuf {
        self.path().join("store")
    }

    /// Open the environment's store.
    pub fn store(&self) -> Result<DirectoryStore> {
        Ok(DirectoryStore::open(self.store_path())?)
    }

    /// Save `config` as the environment's config file.
    pub async fn write_config(&self, config: &GlobalConfig) -> Result<()> {
        config.save_to(&self.config_path()).await
    }

    /// Create a file relative to the environment root, creating parent directories.
    pub fn create_file(&self, path: impl AsRef<Path>, content: &str) -> Result<PathBuf> {
        let full_path = self.path().join(path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&full_path, content)
            .with_context(|| format!("Failed to write {}", full_path.display()))?;
        Ok(full_path)
    }

    pub fn read_file(&self, path: impl AsRef<Path>) -> Result<String> {
        let full_path = self.path().join(path);
        std::fs::read_to_string(&full_path)
            .with_context(|| format!("Failed to read {}", full_path.display()))
    }

    pub fn file_exists(&self, path: impl AsRef<Path>) -> bool {
        self.path().join(path).exists()
    }
}
