//! Template types and error definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::enums::{Application, FieldType, Language};
use super::repository::RepositoryError;
use crate::validation::ValidationErrors;

/// Template-specific error type
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template not found")]
    TemplateNotFound,

    #[error("Template content for language not found")]
    ContentNotFound,

    #[error("Template already exists")]
    AlreadyExists,

    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("Template repository error: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for TemplateError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict { .. } => TemplateError::AlreadyExists,
            other => TemplateError::Repository(other),
        }
    }
}

/// Result type for template operations
pub type TemplateResult<T> = Result<T, TemplateError>;

/// A template aggregate: identity plus the fields and contents it owns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: Uuid,

    pub application: Application,

    /// Unique per application
    pub code: String,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    /// Declared placeholders, in declaration order
    pub fields: Vec<TemplateField>,

    /// At most one per language
    pub contents: Vec<TemplateContent>,
}

impl Template {
    pub fn content_for(&self, language: Language) -> Option<&TemplateContent> {
        self.contents.iter().find(|c| c.language == language)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateField {
    pub id: Uuid,
    pub template_id: Uuid,
    /// Placeholder name
    pub field: String,
    pub description: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateContent {
    pub id: Uuid,
    pub template_id: Uuid,
    pub language: Language,
    /// Email subject, may contain placeholders
    pub subject: String,
    /// HTML body, may contain placeholders
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to create a new template
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTemplateRequest {
    pub application: Application,
    pub code: String,
    pub fields: Vec<CreateFieldRequest>,
    pub contents: Vec<CreateContentRequest>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateFieldRequest {
    pub field: String,
    pub description: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateContentRequest {
    pub language: Language,
    pub subject: String,
    pub content: String,
}

impl From<CreateTemplateRequest> for Template {
    fn from(req: CreateTemplateRequest) -> Self {
        let now = Utc::now();
        let id = Uuid::new_v4();

        let fields = req
            .fields
            .into_iter()
            .map(|f| TemplateField {
                id: Uuid::new_v4(),
                template_id: id,
                field: f.field,
                description: f.description,
                field_type: f.field_type,
                created_at: now,
                updated_at: now,
            })
            .collect();

        let contents = req
            .contents
            .into_iter()
            .map(|c| TemplateContent {
                id: Uuid::new_v4(),
                template_id: id,
                language: c.language,
                subject: c.subject,
                content: c.content,
                created_at: now,
                updated_at: now,
            })
            .collect();

        Template {
            id,
            application: req.application,
            code: req.code,
            created_at: now,
            updated_at: now,
            fields,
            contents,
        }
    }
}

/// Lookup key of a formatted template
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindFormattedQuery {
    pub code: String,
    pub application: Application,
    pub language: Language,
}

/// Field declaration as exposed by a formatted template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedField {
    pub field: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub description: String,
}

impl From<&TemplateField> for FormattedField {
    fn from(field: &TemplateField) -> Self {
        Self {
            field: field.field.clone(),
            field_type: field.field_type,
            description: field.description.clone(),
        }
    }
}

/// A template resolved for one language, ready for interpolation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedTemplate {
    pub fields: Vec<FormattedField>,
    pub subject: String,
    pub content: String,
}

/// Response for listing templates
#[derive(Debug, Serialize)]
pub struct TemplateListResponse {
    /// List of templates
    pub templates: Vec<Template>,

    /// Total count
    pub total: usize,
}
