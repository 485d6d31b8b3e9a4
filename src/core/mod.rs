//! Core types for mailbars
//!
//! This module holds the application-level error type shared by the store,
//! the delivery collaborator, the service layer and the CLI:
//! - **Strongly-typed errors** ([`MailbarsError`]) for precise error handling in code
//! - **User-friendly contexts** ([`ErrorContext`]) with actionable suggestions for CLI users
//!
//! Template engine failures live in [`crate::templating::TemplateError`] and
//! are wrapped by [`MailbarsError::RenderFailed`] at the service boundary.
//!
//! # Examples
//!
//! ```rust,no_run
//! use mailbars::core::{MailbarsError, user_friendly_error};
//! use anyhow::Result;
//!
//! fn example_operation() -> Result<String> {
//!     Err(MailbarsError::StoreNotFound {
//!         path: "/tmp/store".to_string(),
//!     }
//!     .into())
//! }
//!
//! if let Err(e) = example_operation() {
//!     // Shows colored error with suggestions
//!     user_friendly_error(e).display();
//! }
//! ```

pub mod error;

pub use error::{ErrorContext, MailbarsError, user_friendly_error};
