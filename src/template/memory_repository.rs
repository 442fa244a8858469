//! In-memory template repository

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use super::enums::Application;
use super::repository::{RepositoryError, TemplateRepository};
use super::types::Template;

/// In-memory template storage keyed by (application, code)
pub struct MemoryTemplateRepository {
    templates: DashMap<(Application, String), Template>,
}

impl Default for MemoryTemplateRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTemplateRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self {
            templates: DashMap::new(),
        }
    }

    /// Get the number of templates
    pub fn count(&self) -> usize {
        self.templates.len()
    }
}

#[async_trait]
impl TemplateRepository for MemoryTemplateRepository {
    async fn insert(&self, template: Template) -> Result<Template, RepositoryError> {
        let key = (template.application, template.code.clone());

        match self.templates.entry(key) {
            Entry::Occupied(_) => Err(RepositoryError::Conflict {
                application: template.application,
                code: template.code,
            }),
            Entry::Vacant(slot) => {
                slot.insert(template.clone());
                Ok(template)
            }
        }
    }

    async fn find_by_app_and_code(
        &self,
        application: Application,
        code: &str,
    ) -> Result<Option<Template>, RepositoryError> {
        Ok(self
            .templates
            .get(&(application, code.to_string()))
            .map(|t| t.clone()))
    }

    async fn list(
        &self,
        application: Option<Application>,
    ) -> Result<Vec<Template>, RepositoryError> {
        let mut templates: Vec<Template> = self
            .templates
            .iter()
            .filter(|entry| application.map_or(true, |app| entry.key().0 == app))
            .map(|entry| entry.value().clone())
            .collect();

        templates.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(templates)
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Template>, RepositoryError> {
        let key = self
            .templates
            .iter()
            .find(|entry| entry.value().id == id)
            .map(|entry| entry.key().clone());

        Ok(key
            .and_then(|key| self.templates.remove(&key))
            .map(|(_, template)| template))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
