//! Template error handling for mailbars
//!
//! Every variant here is terminal for the render call that produced it: the
//! engine returns the error and no partial output. Data-level problems (a
//! value that is not a date, an unknown locale) never surface as errors; the
//! helpers degrade in place instead.

/// Errors raised while compiling or rendering a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// Template text failed to compile.
    Syntax {
        message: String,
    },

    /// A supplied partial failed to compile.
    PartialSyntax {
        name: String,
        message: String,
    },

    /// The engine rejected the template while evaluating it, e.g. an undefined helper.
    Evaluation {
        message: String,
        suggestion: Option<String>,
    },

    /// A configured constant helper cannot be registered.
    InvalidConstant {
        name: String,
        reason: String,
    },
}

impl std::fmt::Display for TemplateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateError::Syntax {
                message,
            } => write!(f, "Template syntax error: {}", message),
            TemplateError::PartialSyntax {
                name,
                message,
            } => write!(f, "Syntax error in partial '{}': {}", name, message),
            TemplateError::Evaluation {
                message,
                ..
            } => write!(f, "Template rendering failed: {}", message),
            TemplateError::InvalidConstant {
                name,
                reason,
            } => write!(f, "Invalid constant helper '{}': {}", name, reason),
        }
    }
}

impl std::error::Error for TemplateError {}

impl TemplateError {
    /// Whether the error comes from malformed template text rather than configuration.
    pub fn is_malformed_template(&self) -> bool {
        !matches!(self, TemplateError::InvalidConstant { .. })
    }

    pub fn suggestion(&self) -> Option<&str> {
        match self {
            TemplateError::Evaluation {
                suggestion,
                ..
            } => suggestion.as_deref(),
            _ => None,
        }
    }

    /// Generate a user-friendly multi-line message with hints.
    pub fn format_with_context(&self) -> String {
        let mut msg = String::new();
        match self {
            TemplateError::Syntax {
                message,
            } => {
                msg.push_str("ERROR: Template Syntax Error\n\n");
                msg.push_str(&format!("{}\n\n", message));
                msg.push_str("Check that every {{#block}} has a matching {{/block}} ");
                msg.push_str("and that every {{ is closed.\n");
            }
            TemplateError::PartialSyntax {
                name,
                message,
            } => {
                msg.push_str("ERROR: Partial Syntax Error\n\n");
                msg.push_str(&format!("Partial: {}\n", name));
                msg.push_str(&format!("{}\n", message));
            }
            TemplateError::Evaluation {
                message,
                suggestion,
            } => {
                msg.push_str("ERROR: Template Rendering Failed\n\n");
                msg.push_str(&format!("{}\n", message));
                if let Some(suggestion) = suggestion {
                    msg.push_str(&format!("\nDid you mean '{}'?\n", suggestion));
                }
                msg.push_str("\nRun 'mailbars helpers' to list the available helpers.\n");
            }
            TemplateError::InvalidConstant {
                name,
                reason,
            } => {
                msg.push_str("ERROR: Invalid Constant Helper\n\n");
                msg.push_str(&format!("Constant: {}\n{}\n", name, reason));
                msg.push_str("\nRename the entry in the [constants] table of your config file.\n");
            }
        }
        msg
    }
}
