//! Directory-backed template store.
//!
//! Templates are `.hbs` files under `templates/` with a YAML frontmatter
//! header; partials are `.hbs` files under `partials/` named after the
//! partial; attachments are plain files under `attachments/<template id>/`.
//!
//! ```text
//! ---
//! id: 1
//! name: Welcome Email
//! subject: Welcome to {{Company}}, {{Name}}!
//! ---
//! <!DOCTYPE html><html>...{{> header}}...</html>
//! ```

use async_trait::async_trait;
use gray_matter::{Matter, Pod, engine::Engine};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use walkdir::WalkDir;

use super::{Attachment, EmailTemplate, Partial, TemplateStore, content_type_for, seed};
use crate::constants::TEMPLATE_FILE_EXTENSION;
use crate::core::MailbarsError;

const TEMPLATES_DIR: &str = "templates";
const PARTIALS_DIR: &str = "partials";
const ATTACHMENTS_DIR: &str = "attachments";

/// gray_matter engine that hands back the frontmatter text untouched, so the
/// YAML is parsed (and reported) by serde_yaml.
struct RawFrontmatter;

impl Engine for RawFrontmatter {
    fn parse(content: &str) -> Result<Pod, gray_matter::Error> {
        Ok(Pod::String(content.to_string()))
    }
}

/// Frontmatter of a template file.
#[derive(Debug, Serialize, Deserialize)]
struct TemplateHeader {
    id: u32,
    name: String,
    #[serde(default)]
    subject: String,
}

/// Template store rooted at a directory.
///
/// Writes are serialized through an internal lock; reads go straight to disk
/// so edits made outside the process are picked up on the next call.
#[derive(Debug)]
pub struct DirectoryStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl DirectoryStore {
    /// Open an existing store.
    ///
    /// # Errors
    ///
    /// [`MailbarsError::StoreNotFound`] if `root` has no `templates/` directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, MailbarsError> {
        let root = root.into();
        if !root.join(TEMPLATES_DIR).is_dir() {
            return Err(MailbarsError::StoreNotFound {
                path: root.display().to_string(),
            });
        }
        Ok(Self::unchecked(root))
    }

    /// Create a store at `root` holding the seed partials and templates.
    ///
    /// # Errors
    ///
    /// [`MailbarsError::AlreadyExists`] if `root` already holds a store and
    /// `force` is not set; file system errors otherwise.
    pub async fn init(root: impl Into<PathBuf>, force: bool) -> Result<Self, MailbarsError> {
        let root = root.into();
        let templates_dir = root.join(TEMPLATES_DIR);
        if templates_dir.exists() && !force {
            return Err(MailbarsError::AlreadyExists {
                path: root.display().to_string(),
            });
        }

        for dir in [TEMPLATES_DIR, PARTIALS_DIR, ATTACHMENTS_DIR] {
            let path = root.join(dir);
            fs::create_dir_all(&path)
                .await
                .map_err(MailbarsError::file_system("create directory", &path))?;
        }

        let store = Self::unchecked(root);
        for partial in seed::partials() {
            store.upsert_partial(partial).await?;
        }
        for template in seed::templates() {
            store.upsert_template(template).await?;
        }
        tracing::info!("Initialized template store at {}", store.root.display());
        Ok(store)
    }

    fn unchecked(root: PathBuf) -> Self {
        Self {
            root,
            write_lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn templates_dir(&self) -> PathBuf {
        self.root.join(TEMPLATES_DIR)
    }

    fn partials_dir(&self) -> PathBuf {
        self.root.join(PARTIALS_DIR)
    }

    fn attachments_dir(&self, template_id: u32) -> PathBuf {
        self.root.join(ATTACHMENTS_DIR).join(template_id.to_string())
    }

    fn partial_path(&self, name: &str) -> PathBuf {
        self.partials_dir().join(format!("{name}.{TEMPLATE_FILE_EXTENSION}"))
    }

    /// Template files found under `templates/`, with their parsed contents.
    async fn read_templates(&self) -> Result<Vec<(PathBuf, EmailTemplate)>, MailbarsError> {
        let mut templates = Vec::new();
        for path in template_files(&self.templates_dir()) {
            let content = fs::read_to_string(&path)
                .await
                .map_err(MailbarsError::file_system("read template", &path))?;
            templates.push((path.clone(), parse_template_file(&content, &path)?));
        }
        templates.sort_by_key(|(_, t)| t.id);
        Ok(templates)
    }

    async fn read_attachments(&self, template_id: u32, with_content: bool) -> Result<Vec<Attachment>, MailbarsError> {
        let dir = self.attachments_dir(template_id);
        let mut attachments = Vec::new();
        for (id, path) in (1..).zip(regular_files(&dir)) {
            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            let content = if with_content {
                fs::read(&path).await.map_err(MailbarsError::file_system("read attachment", &path))?
            } else {
                Vec::new()
            };
            attachments.push(Attachment {
                id,
                template_id,
                content_type: content_type_for(&file_name).to_string(),
                file_name,
                content,
            });
        }
        Ok(attachments)
    }
}

/// Files directly inside `dir`, sorted by path. A missing directory has none.
fn regular_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.is_dir() {
        return Vec::new();
    }
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect();
    files.sort();
    files
}

fn template_files(dir: &Path) -> Vec<PathBuf> {
    regular_files(dir)
        .into_iter()
        .filter(|path| path.extension().is_some_and(|ext| ext == TEMPLATE_FILE_EXTENSION))
        .collect()
}

fn trim_body(body: &str) -> String {
    body.trim_start_matches(['\r', '\n']).trim_end_matches(['\r', '\n']).to_string()
}

fn parse_template_file(content: &str, path: &Path) -> Result<EmailTemplate, MailbarsError> {
    let invalid = |reason: String| MailbarsError::InvalidTemplateFile {
        file: path.display().to_string(),
        reason,
    };

    let matter = Matter::<RawFrontmatter>::new();
    let parsed = matter.parse::<String>(content).map_err(|e| invalid(e.to_string()))?;
    let frontmatter = parsed
        .data
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| invalid("missing frontmatter block".to_string()))?;

    let header: TemplateHeader =
        serde_yaml::from_str(&frontmatter).map_err(|e| invalid(e.to_string()))?;

    Ok(EmailTemplate {
        id: header.id,
        name: header.name,
        subject: header.subject,
        html_body: trim_body(&parsed.content),
    })
}

fn render_template_file(template: &EmailTemplate) -> Result<String, MailbarsError> {
    let header = TemplateHeader {
        id: template.id,
        name: template.name.clone(),
        subject: template.subject.clone(),
    };
    let yaml = serde_yaml::to_string(&header).map_err(|e| MailbarsError::Other {
        message: format!("Failed to serialize template header: {e}"),
    })?;
    Ok(format!("---\n{yaml}---\n{}\n", template.html_body))
}

/// File stem for a template: lowercase name with runs of other characters
/// collapsed to '-', prefixed with the id so names never collide.
fn template_file_name(template: &EmailTemplate) -> String {
    let mut slug = String::new();
    for c in template.name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        format!("{}.{TEMPLATE_FILE_EXTENSION}", template.id)
    } else {
        format!("{}-{slug}.{TEMPLATE_FILE_EXTENSION}", template.id)
    }
}

fn validate_partial_name(name: &str) -> Result<(), MailbarsError> {
    let valid = !name.is_empty()
        && name.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        && !name.starts_with('.');
    if valid {
        Ok(())
    } else {
        Err(MailbarsError::Other {
            message: format!("Invalid partial name '{name}': use letters, digits, '_', '-' and '.'"),
        })
    }
}

#[async_trait]
impl TemplateStore for DirectoryStore {
    async fn list_templates(&self) -> Result<Vec<EmailTemplate>, MailbarsError> {
        Ok(self.read_templates().await?.into_iter().map(|(_, t)| t).collect())
    }

    async fn get_template(&self, id: u32) -> Result<Option<EmailTemplate>, MailbarsError> {
        Ok(self.read_templates().await?.into_iter().map(|(_, t)| t).find(|t| t.id == id))
    }

    async fn get_template_by_name(&self, name: &str) -> Result<Option<EmailTemplate>, MailbarsError> {
        Ok(self.read_templates().await?.into_iter().map(|(_, t)| t).find(|t| t.name == name))
    }

    async fn upsert_template(&self, mut template: EmailTemplate) -> Result<EmailTemplate, MailbarsError> {
        let _guard = self.write_lock.lock().await;
        let existing = self.read_templates().await?;

        if template.id == 0 {
            template.id = existing.iter().map(|(_, t)| t.id).max().unwrap_or(0) + 1;
        }
        for (path, stored) in &existing {
            if stored.id == template.id {
                fs::remove_file(path)
                    .await
                    .map_err(MailbarsError::file_system("replace template", path))?;
            }
        }

        let dir = self.templates_dir();
        fs::create_dir_all(&dir).await.map_err(MailbarsError::file_system("create directory", &dir))?;
        let path = dir.join(template_file_name(&template));
        fs::write(&path, render_template_file(&template)?)
            .await
            .map_err(MailbarsError::file_system("write template", &path))?;
        tracing::debug!("Wrote template #{} to {}", template.id, path.display());
        Ok(template)
    }

    async fn delete_template(&self, id: u32) -> Result<bool, MailbarsError> {
        let _guard = self.write_lock.lock().await;
        let mut removed = false;
        for (path, stored) in self.read_templates().await? {
            if stored.id == id {
                fs::remove_file(&path)
                    .await
                    .map_err(MailbarsError::file_system("delete template", &path))?;
                removed = true;
            }
        }
        let attachments = self.attachments_dir(id);
        if removed && attachments.is_dir() {
            fs::remove_dir_all(&attachments)
                .await
                .map_err(MailbarsError::file_system("delete attachments", &attachments))?;
        }
        Ok(removed)
    }

    async fn list_partials(&self) -> Result<Vec<Partial>, MailbarsError> {
        let mut partials = Vec::new();
        for (id, path) in (1..).zip(template_files(&self.partials_dir())) {
            let Some(name) = path.file_stem().map(|stem| stem.to_string_lossy().into_owned()) else {
                continue;
            };
            let html_content = fs::read_to_string(&path)
                .await
                .map_err(MailbarsError::file_system("read partial", &path))?;
            partials.push(Partial {
                id,
                name,
                html_content: trim_body(&html_content),
            });
        }
        Ok(partials)
    }

    async fn get_partial_by_name(&self, name: &str) -> Result<Option<Partial>, MailbarsError> {
        Ok(self.list_partials().await?.into_iter().find(|p| p.name == name))
    }

    async fn upsert_partial(&self, mut partial: Partial) -> Result<Partial, MailbarsError> {
        validate_partial_name(&partial.name)?;
        let _guard = self.write_lock.lock().await;

        let dir = self.partials_dir();
        fs::create_dir_all(&dir).await.map_err(MailbarsError::file_system("create directory", &dir))?;
        let path = self.partial_path(&partial.name);
        fs::write(&path, format!("{}\n", partial.html_content))
            .await
            .map_err(MailbarsError::file_system("write partial", &path))?;

        partial.id = self
            .list_partials()
            .await?
            .into_iter()
            .find(|p| p.name == partial.name)
            .map_or(partial.id, |p| p.id);
        Ok(partial)
    }

    async fn delete_partial(&self, name: &str) -> Result<bool, MailbarsError> {
        validate_partial_name(name)?;
        let _guard = self.write_lock.lock().await;
        let path = self.partial_path(name);
        if !path.is_file() {
            return Ok(false);
        }
        fs::remove_file(&path).await.map_err(MailbarsError::file_system("delete partial", &path))?;
        Ok(true)
    }

    async fn template_attachments(&self, template_id: u32) -> Result<Vec<Attachment>, MailbarsError> {
        self.read_attachments(template_id, true).await
    }

    async fn add_attachment(&self, mut attachment: Attachment) -> Result<Attachment, MailbarsError> {
        if self.get_template(attachment.template_id).await?.is_none() {
            return Err(MailbarsError::TemplateNotFound {
                lookup: format!("#{}", attachment.template_id),
            });
        }
        let file_name = Path::new(&attachment.file_name)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| MailbarsError::Other {
                message: format!("Invalid attachment file name '{}'", attachment.file_name),
            })?;

        let _guard = self.write_lock.lock().await;
        let dir = self.attachments_dir(attachment.template_id);
        fs::create_dir_all(&dir).await.map_err(MailbarsError::file_system("create directory", &dir))?;
        let path = dir.join(&file_name);
        fs::write(&path, &attachment.content)
            .await
            .map_err(MailbarsError::file_system("write attachment", &path))?;

        attachment.content_type = content_type_for(&file_name).to_string();
        attachment.file_name = file_name;
        attachment.id = self
            .read_attachments(attachment.template_id, false)
            .await?
            .into_iter()
            .find(|a| a.file_name == attachment.file_name)
            .map_or(0, |a| a.id);
        Ok(attachment)
    }
}
