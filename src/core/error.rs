//! Error handling for mailbars
//!
//! This module provides the application error type and user-friendly error
//! reporting for the mailbars library and CLI. It follows two principles:
//! 1. **Strongly-typed errors** for precise error handling in code
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Architecture
//!
//! - [`MailbarsError`] - Enumerated failures of the collaborators around the
//!   template engine: store lookups, configuration, delivery, rendering
//! - [`ErrorContext`] - Wrapper that adds user-friendly details and suggestions
//!
//! Engine failures are [`TemplateError`]s; when they cross into the
//! application layer they are wrapped in [`MailbarsError::RenderFailed`] so the
//! template being rendered is named in the message.
//!
//! # Examples
//!
//! ```rust,no_run
//! use mailbars::core::{MailbarsError, user_friendly_error};
//!
//! fn lookup() -> Result<(), MailbarsError> {
//!     Err(MailbarsError::TemplateNotFound {
//!         lookup: "Welcome Email".to_string(),
//!     })
//! }
//!
//! if let Err(e) = lookup() {
//!     user_friendly_error(anyhow::Error::from(e)).display();
//! }
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

use crate::templating::TemplateError;

/// The main error type for mailbars operations
#[derive(Error, Debug)]
pub enum MailbarsError {
    /// No template matches the given id or name
    #[error("Template not found: {lookup}")]
    TemplateNotFound {
        /// The id or name that was looked up
        lookup: String,
    },

    /// No partial with the given name exists in the store
    #[error("Partial not found: {name}")]
    PartialNotFound {
        name: String,
    },

    /// A template or partial failed to render
    #[error("Failed to render template '{template}': {source}")]
    RenderFailed {
        /// Name of the template being rendered
        template: String,
        #[source]
        source: TemplateError,
    },

    /// Recipient address is not a valid email address
    #[error("Invalid recipient address: '{address}'")]
    InvalidRecipient {
        address: String,
    },

    /// The delivery collaborator could not send the message
    #[error("Failed to deliver message to {recipient}: {reason}")]
    DeliveryFailed {
        recipient: String,
        reason: String,
    },

    /// A stored template file is malformed
    #[error("Invalid template file {file}: {reason}")]
    InvalidTemplateFile {
        file: String,
        reason: String,
    },

    /// Store directory is missing or was not initialized
    #[error("Template store not found at {path}")]
    StoreNotFound {
        path: String,
    },

    /// Refusing to overwrite an existing store or file
    #[error("{path} already exists")]
    AlreadyExists {
        path: String,
    },

    /// Global configuration could not be parsed or is invalid
    #[error("Invalid configuration in {file}: {reason}")]
    ConfigError {
        file: String,
        reason: String,
    },

    /// Template data could not be read
    #[error("Invalid template data: {reason}")]
    InvalidData {
        reason: String,
    },

    /// File system operation failed
    #[error("File system error during {operation} of {path}: {reason}")]
    FileSystemError {
        operation: String,
        path: String,
        reason: String,
    },

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerError(#[from] toml::ser::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Anything else
    #[error("{message}")]
    Other {
        message: String,
    },
}

impl MailbarsError {
    /// Map an I/O failure on `path` into a [`MailbarsError::FileSystemError`].
    pub fn file_system<'a>(
        operation: &'a str,
        path: &'a std::path::Path,
    ) -> impl FnOnce(std::io::Error) -> Self + 'a {
        move |err| Self::FileSystemError {
            operation: operation.to_string(),
            path: path.display().to_string(),
            reason: err.to_string(),
        }
    }
}

impl Clone for MailbarsError {
    fn clone(&self) -> Self {
        match self {
            Self::TemplateNotFound {
                lookup,
            } => Self::TemplateNotFound {
                lookup: lookup.clone(),
            },
            Self::PartialNotFound {
                name,
            } => Self::PartialNotFound {
                name: name.clone(),
            },
            Self::RenderFailed {
                template,
                source,
            } => Self::RenderFailed {
                template: template.clone(),
                source: source.clone(),
            },
            Self::InvalidRecipient {
                address,
            } => Self::InvalidRecipient {
                address: address.clone(),
            },
            Self::DeliveryFailed {
                recipient,
                reason,
            } => Self::DeliveryFailed {
                recipient: recipient.clone(),
                reason: reason.clone(),
            },
            Self::InvalidTemplateFile {
                file,
                reason,
            } => Self::InvalidTemplateFile {
                file: file.clone(),
                reason: reason.clone(),
            },
            Self::StoreNotFound {
                path,
            } => Self::StoreNotFound {
                path: path.clone(),
            },
            Self::AlreadyExists {
                path,
            } => Self::AlreadyExists {
                path: path.clone(),
            },
            Self::ConfigError {
                file,
                reason,
            } => Self::ConfigError {
                file: file.clone(),
                reason: reason.clone(),
            },
            Self::InvalidData {
                reason,
            } => Self::InvalidData {
                reason: reason.clone(),
            },
            Self::FileSystemError {
                operation,
                path,
                reason,
            } => Self::FileSystemError {
                operation: operation.clone(),
                path: path.clone(),
                reason: reason.clone(),
            },
            // Source errors are not Clone; keep their message
            Self::IoError(e) => Self::Other {
                message: format!("IO error: {e}"),
            },
            Self::TomlError(e) => Self::Other {
                message: format!("TOML parsing error: {e}"),
            },
            Self::TomlSerError(e) => Self::Other {
                message: format!("TOML serialization error: {e}"),
            },
            Self::JsonError(e) => Self::Other {
                message: format!("JSON error: {e}"),
            },
            Self::Other {
                message,
            } => Self::Other {
                message: message.clone(),
            },
        }
    }
}

/// Error with user-facing details and a suggestion
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: MailbarsError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    #[must_use]
    pub const fn new(error: MailbarsError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr: error in red, details in yellow, suggestion in green.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] with suggestions.
///
/// Known error types ([`MailbarsError`], [`TemplateError`], I/O, TOML, JSON)
/// are matched first; anything else keeps its full cause chain in the message.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(mailbars_error) = error.downcast_ref::<MailbarsError>() {
        return create_error_context(mailbars_error.clone());
    }

    if let Some(template_error) = error.downcast_ref::<TemplateError>() {
        return template_error_context(String::from("template"), template_error);
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(MailbarsError::FileSystemError {
                    operation: "file access".to_string(),
                    path: "unknown".to_string(),
                    reason: io_error.to_string(),
                })
                .with_suggestion("Check file ownership and permissions")
                .with_details(format!("{error:#}"));
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(MailbarsError::FileSystemError {
                    operation: "file access".to_string(),
                    path: "unknown".to_string(),
                    reason: io_error.to_string(),
                })
                .with_suggestion("Check that the file or directory exists and the path is correct")
                .with_details(format!("{error:#}"));
            }
            _ => {}
        }
    }

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(MailbarsError::ConfigError {
            file: "config.toml".to_string(),
            reason: toml_error.to_string(),
        })
        .with_suggestion("Check the TOML syntax in your config file. Verify quotes, brackets, and indentation");
    }

    if let Some(json_error) = error.downcast_ref::<serde_json::Error>() {
        return ErrorContext::new(MailbarsError::InvalidData {
            reason: json_error.to_string(),
        })
        .with_suggestion("Template data must be a JSON document, e.g. {\"Name\": \"Ada\"}");
    }

    // Generic error - include the full error chain for better diagnostics
    let mut message = error.to_string();
    let chain: Vec<String> =
        error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(MailbarsError::Other {
        message,
    })
}

fn template_error_context(template: String, error: &TemplateError) -> ErrorContext {
    let mut context = ErrorContext::new(MailbarsError::RenderFailed {
        template,
        source: error.clone(),
    })
    .with_details(error.format_with_context().trim_end().to_string());

    context = match error {
        TemplateError::Evaluation {
            suggestion: Some(suggestion),
            ..
        } => context.with_suggestion(format!("Did you mean '{suggestion}'?")),
        TemplateError::Evaluation {
            ..
        } => context.with_suggestion("Run 'mailbars helpers' to list the available helpers"),
        TemplateError::Syntax {
            ..
        }
        | TemplateError::PartialSyntax {
            ..
        } => context.with_suggestion("Check that every {{#block}} is closed by a matching {{/block}}"),
        TemplateError::InvalidConstant {
            ..
        } => context.with_suggestion("Rename the constant in the [constants] table of your config file"),
    };
    context
}

fn create_error_context(error: MailbarsError) -> ErrorContext {
    match &error {
        MailbarsError::TemplateNotFound {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Run 'mailbars templates list' to see the available templates")
            .with_details("Templates can be looked up by numeric id or by name"),

        MailbarsError::PartialNotFound {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Run 'mailbars partials list' to see the available partials"),

        MailbarsError::RenderFailed {
            template,
            source,
        } => template_error_context(template.clone(), source),

        MailbarsError::InvalidRecipient {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Use an address of the form name@example.com"),

        MailbarsError::DeliveryFailed {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("The message was rendered but not sent; retry once the mail transport is reachable"),

        MailbarsError::StoreNotFound {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Run 'mailbars init' to create a template store, or pass --store <DIR>"),

        MailbarsError::AlreadyExists {
            ..
        } => ErrorContext::new(error).with_suggestion("Use --force to overwrite"),

        MailbarsError::ConfigError {
            file,
            ..
        } => {
            let suggestion = format!("Check {file}, or run 'mailbars config init --force' to recreate it");
            ErrorContext::new(error).with_suggestion(suggestion)
        }

        MailbarsError::InvalidTemplateFile {
            ..
        } => ErrorContext::new(error).with_details(
            "Template files start with a YAML frontmatter block declaring id, name and subject",
        ),

        _ => ErrorContext::new(error),
    }
}
