//! Template store: where templates, partials and attachments come from.
//!
//! The template engine never reads storage itself. Callers fetch a template
//! and the partial set from a [`TemplateStore`] and hand the text to the
//! engine. Two implementations ship with the crate:
//!
//! - [`MemoryStore`]: maps behind a `tokio::sync::RwLock`, used by tests and
//!   embedding applications
//! - [`DirectoryStore`]: `.hbs` files on disk, used by the CLI
//!
//! # Directory layout
//!
//! ```text
//! store/
//! ├── templates/
//! │   └── welcome-email.hbs     # YAML frontmatter: id, name, subject
//! ├── partials/
//! │   ├── footer.hbs            # partial name = file stem
//! │   └── header.hbs
//! └── attachments/
//!     └── 1/                    # template id
//!         └── terms.pdf
//! ```

mod directory;
mod memory;
pub mod seed;

pub use directory::DirectoryStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::MailbarsError;
use crate::templating::PartialSet;

/// A stored email template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailTemplate {
    /// Store-assigned id; `0` asks the store to assign one on upsert.
    pub id: u32,
    pub name: String,
    /// Subject line template.
    pub subject: String,
    /// HTML body template.
    pub html_body: String,
}

/// A named template fragment, referenced as `{{> name}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partial {
    pub id: u32,
    pub name: String,
    pub html_content: String,
}

/// A file delivered with every message rendered from a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: u32,
    pub template_id: u32,
    pub file_name: String,
    pub content_type: String,
    #[serde(skip)]
    pub content: Vec<u8>,
}

/// How a caller identifies a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateLookup {
    /// The template with the lowest id.
    First,
    Id(u32),
    Name(String),
}

impl TemplateLookup {
    /// Interpret command-line input: digits are an id, anything else a name.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        match trimmed.parse::<u32>() {
            Ok(id) => Self::Id(id),
            Err(_) => Self::Name(trimmed.to_string()),
        }
    }
}

impl fmt::Display for TemplateLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::First => write!(f, "<first template>"),
            Self::Id(id) => write!(f, "#{id}"),
            Self::Name(name) => write!(f, "{name}"),
        }
    }
}

impl From<&str> for TemplateLookup {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<u32> for TemplateLookup {
    fn from(value: u32) -> Self {
        Self::Id(value)
    }
}

/// Guess a MIME type from a file name.
pub fn content_type_for(file_name: &str) -> &'static str {
    let extension = file_name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("txt") => "text/plain",
        Some("csv") => "text/csv",
        Some("html" | "htm") => "text/html",
        Some("json") => "application/json",
        Some("zip") => "application/zip",
        _ => "application/octet-stream",
    }
}

/// Repository of templates, partials and attachments.
///
/// Name lookups are exact and case-sensitive.
#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// All templates ordered by id.
    async fn list_templates(&self) -> Result<Vec<EmailTemplate>, MailbarsError>;

    async fn get_template(&self, id: u32) -> Result<Option<EmailTemplate>, MailbarsError>;

    async fn get_template_by_name(&self, name: &str) -> Result<Option<EmailTemplate>, MailbarsError>;

    /// Insert a template (id `0` assigns a fresh id) or replace the one with the same id.
    async fn upsert_template(&self, template: EmailTemplate) -> Result<EmailTemplate, MailbarsError>;

    /// Returns whether a template was removed.
    async fn delete_template(&self, id: u32) -> Result<bool, MailbarsError>;

    /// All partials ordered by name.
    async fn list_partials(&self) -> Result<Vec<Partial>, MailbarsError>;

    async fn get_partial_by_name(&self, name: &str) -> Result<Option<Partial>, MailbarsError>;

    /// Insert or replace the partial with the same name.
    async fn upsert_partial(&self, partial: Partial) -> Result<Partial, MailbarsError>;

    async fn delete_partial(&self, name: &str) -> Result<bool, MailbarsError>;

    async fn template_attachments(&self, template_id: u32) -> Result<Vec<Attachment>, MailbarsError>;

    async fn add_attachment(&self, attachment: Attachment) -> Result<Attachment, MailbarsError>;

    async fn first_template(&self) -> Result<Option<EmailTemplate>, MailbarsError> {
        Ok(self.list_templates().await?.into_iter().min_by_key(|t| t.id))
    }

    async fn find_template(&self, lookup: &TemplateLookup) -> Result<Option<EmailTemplate>, MailbarsError> {
        match lookup {
            TemplateLookup::First => self.first_template().await,
            TemplateLookup::Id(id) => self.get_template(*id).await,
            TemplateLookup::Name(name) => self.get_template_by_name(name).await,
        }
    }

    /// Every partial, keyed by name, ready to hand to the engine.
    async fn partial_set(&self) -> Result<PartialSet, MailbarsError> {
        Ok(self
            .list_partials()
            .await?
            .into_iter()
            .map(|p| (p.name, p.html_content))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_parse() {
        assert_eq!(TemplateLookup::parse("42"), TemplateLookup::Id(42));
        assert_eq!(TemplateLookup::parse(" Welcome Email "), TemplateLookup::Name("Welcome Email".into()));
        assert_eq!(TemplateLookup::parse("-1"), TemplateLookup::Name("-1".into()));
        assert_eq!(TemplateLookup::Id(3).to_string(), "#3");
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("terms.PDF"), "application/pdf");
        assert_eq!(content_type_for("logo.jpeg"), "image/jpeg");
        assert_eq!(content_type_for("README"), "application/octet-stream");
    }
}
