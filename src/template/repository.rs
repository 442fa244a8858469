//! Repository trait for template storage.
//!
//! This module defines the abstraction layer for template persistence,
//! allowing different storage implementations (memory, PostgreSQL) to be
//! used interchangeably. Implementations store the whole aggregate: a
//! template is written together with its fields and contents, or not at all.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use super::enums::Application;
use super::types::Template;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// A template with the same (application, code) already exists
    #[error("Template {application}/{code} already exists")]
    Conflict {
        application: Application,
        code: String,
    },

    /// PostgreSQL operation failed
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// A stored row could not be mapped back to the domain model
    #[error("Corrupt template row: {0}")]
    Corrupt(String),
}

/// Storage for template aggregates.
#[async_trait]
pub trait TemplateRepository: Send + Sync {
    /// Persist a new template with its fields and contents.
    async fn insert(&self, template: Template) -> Result<Template, RepositoryError>;

    /// Look up a template by its (application, code) identity.
    async fn find_by_app_and_code(
        &self,
        application: Application,
        code: &str,
    ) -> Result<Option<Template>, RepositoryError>;

    /// List templates ordered by code, optionally restricted to one application.
    async fn list(&self, application: Option<Application>)
        -> Result<Vec<Template>, RepositoryError>;

    /// Delete a template and everything it owns. Returns the deleted aggregate.
    async fn delete(&self, id: Uuid) -> Result<Option<Template>, RepositoryError>;

    /// Backend identifier (e.g. `"memory"`, `"postgres"`).
    fn backend_name(&self) -> &'static str;
}
