//! Common test utilities for mailbars integration tests

// Not every test module uses every helper
#![allow(dead_code)]

use anyhow::{Context, Result};
use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary project with its own config file and template store.
///
/// The binary is always run with `--config` and `--store` pointing into the
/// temp directory, so tests never touch the user's `~/.mailbars`.
pub struct TestProject {
    _temp_dir: TempDir, // Keep alive for RAII cleanup
    root: PathBuf,
}

impl TestProject {
    /// A project with no config file and no store.
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path().to_path_buf();
        Ok(Self {
            _temp_dir: temp_dir,
            root,
        })
    }

    /// A project whose store has been created with `mailbars init`.
    pub fn initialized() -> Result<Self> {
        let project = Self::new()?;
        project.mailbars().arg("init").assert().success();
        Ok(project)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join("config.toml")
    }

    pub fn store_path(&self) -> PathBuf {
        self.root.join("store")
    }

    pub fn write_config(&self, content: &str) -> Result<()> {
        fs::write(self.config_path(), content).context("Failed to write config")
    }

    /// Write a file relative to the project root and return its full path.
    pub fn write_file(&self, path: &str, content: &str) -> Result<PathBuf> {
        let full_path = self.root.join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&full_path, content)
            .with_context(|| format!("Failed to write {}", full_path.display()))?;
        Ok(full_path)
    }

    /// A `mailbars` command bound to this project's config and store.
    pub fn mailbars(&self) -> Command {
        let mut cmd = Command::cargo_bin("mailbars").expect("mailbars binary should be built");
        cmd.current_dir(&self.root)
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG")
            .arg("--config")
            .arg(self.config_path())
            .arg("--store")
            .arg(self.store_path());
        cmd
    }

    /// Run `mailbars` with `args` and capture the output.
    pub fn run_mailbars(&self, args: &[&str]) -> Result<CommandOutput> {
        let output = self.mailbars().args(args).output().context("Failed to run mailbars")?;
        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        })
    }
}

/// Command output helper
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    pub code: Option<i32>,
}

impl CommandOutput {
    pub fn assert_success(&self) -> &Self {
        assert!(
            self.success,
            "Command failed with code {:?}\nStderr: {}",
            self.code, self.stderr
        );
        self
    }

    pub fn assert_failure(&self) -> &Self {
        assert!(!self.success, "Command unexpectedly succeeded\nStdout: {}", self.stdout);
        self
    }

    pub fn assert_stdout_contains(&self, text: &str) -> &Self {
        assert!(
            self.stdout.contains(text),
            "Expected stdout to contain '{}'\nActual stdout: {}",
            text,
            self.stdout
        );
        self
    }

    pub fn assert_stderr_contains(&self, text: &str) -> &Self {
        assert!(
            self.stderr.contains(text),
            "Expected stderr to contain '{}'\nActual stderr: {}",
            text,
            self.stderr
        );
        self
    }
}
