//! Test utilities for mailbars
//!
//! Helpers for writing tests: isolated temporary environments holding a
//! config file and a template store, sample data models, and one-time
//! logging initialization.
//!
//! # Example
//!
//! ```rust,ignore
//! use mailbars::test_utils::TestEnvironment;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let env = TestEnvironment::seeded().await?;
//! assert!(env.file_exists("store/templates/1-welcome-email.hbs"));
//! # Ok(())
//! # }
//! ```

pub mod environment;
pub mod fixtures;

pub use environment::TestEnvironment;
pub use fixtures::DataFixture;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Installs the tracing subscriber once, regardless of how many tests call
/// it. Uses `level` when given, otherwise `RUST_LOG`; with neither, logging
/// stays off.
///
/// ```bash
/// RUST_LOG=mailbars=trace cargo test isolation
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(true)
            .try_init();
    });
}
