//! In-memory template store.

use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::{Attachment, EmailTemplate, Partial, TemplateStore, seed};
use crate::core::MailbarsError;

#[derive(Debug, Default)]
struct Inner {
    templates: BTreeMap<u32, EmailTemplate>,
    partials: BTreeMap<String, Partial>,
    attachments: Vec<Attachment>,
    next_template_id: u32,
    next_partial_id: u32,
    next_attachment_id: u32,
}

/// Template store held entirely in memory.
///
/// Ids are assigned monotonically and never reused.
///
/// # Examples
///
/// ```rust,no_run
/// use mailbars::store::{MemoryStore, TemplateStore};
///
/// # async fn example() -> Result<(), mailbars::core::MailbarsError> {
/// let store = MemoryStore::seeded();
/// let welcome = store.get_template_by_name("Welcome Email").await?;
/// assert!(welcome.is_some());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding the seed partials and templates.
    pub fn seeded() -> Self {
        let mut inner = Inner::default();
        for template in seed::templates() {
            inner.next_template_id = inner.next_template_id.max(template.id);
            inner.templates.insert(template.id, template);
        }
        for partial in seed::partials() {
            inner.next_partial_id = inner.next_partial_id.max(partial.id);
            inner.partials.insert(partial.name.clone(), partial);
        }
        Self {
            inner: RwLock::new(inner),
        }
    }
}

#[async_trait]
impl TemplateStore for MemoryStore {
    async fn list_templates(&self) -> Result<Vec<EmailTemplate>, MailbarsError> {
        Ok(self.inner.read().await.templates.values().cloned().collect())
    }

    async fn get_template(&self, id: u32) -> Result<Option<EmailTemplate>, MailbarsError> {
        Ok(self.inner.read().await.templates.get(&id).cloned())
    }

    async fn get_template_by_name(&self, name: &str) -> Result<Option<EmailTemplate>, MailbarsError> {
        Ok(self.inner.read().await.templates.values().find(|t| t.name == name).cloned())
    }

    async fn upsert_template(&self, mut template: EmailTemplate) -> Result<EmailTemplate, MailbarsError> {
        let mut inner = self.inner.write().await;
        if template.id == 0 {
            inner.next_template_id += 1;
            template.id = inner.next_template_id;
        } else {
            inner.next_template_id = inner.next_template_id.max(template.id);
        }
        tracing::debug!("Storing template #{} '{}'", template.id, template.name);
        inner.templates.insert(template.id, template.clone());
        Ok(template)
    }

    async fn delete_template(&self, id: u32) -> Result<bool, MailbarsError> {
        let mut inner = self.inner.write().await;
        let removed = inner.templates.remove(&id).is_some();
        if removed {
            inner.attachments.retain(|a| a.template_id != id);
        }
        Ok(removed)
    }

    async fn list_partials(&self) -> Result<Vec<Partial>, MailbarsError> {
        Ok(self.inner.read().await.partials.values().cloned().collect())
    }

    async fn get_partial_by_name(&self, name: &str) -> Result<Option<Partial>, MailbarsError> {
        Ok(self.inner.read().await.partials.get(name).cloned())
    }

    async fn upsert_partial(&self, mut partial: Partial) -> Result<Partial, MailbarsError> {
        let mut inner = self.inner.write().await;
        match inner.partials.get(&partial.name) {
            Some(existing) => partial.id = existing.id,
            None => {
                inner.next_partial_id += 1;
                partial.id = inner.next_partial_id;
            }
        }
        inner.partials.insert(partial.name.clone(), partial.clone());
        Ok(partial)
    }

    async fn delete_partial(&self, name: &str) -> Result<bool, MailbarsError> {
        Ok(self.inner.write().await.partials.remove(name).is_some())
    }

    async fn template_attachments(&self, template_id: u32) -> Result<Vec<Attachment>, MailbarsError> {
        Ok(self
            .inner
            .read()
            .await
            .attachments
            .iter()
            .filter(|a| a.template_id == template_id)
            .cloned()
            .collect())
    }

    async fn add_attachment(&self, mut attachment: Attachment) -> Result<Attachment, MailbarsError> {
        let mut inner = self.inner.write().await;
        if !inner.templates.contains_key(&attachment.template_id) {
            return Err(MailbarsError::TemplateNotFound {
                lookup: format!("#{}", attachment.template_id),
            });
        }
        inner.next_attachment_id += 1;
        attachment.id = inner.next_attachment_id;
        inner.attachments.push(attachment.clone());
        Ok(attachment)
    }
}
