//! PostgreSQL-based template repository.
//!
//! Stores the aggregate across three tables (`templates`, `template_fields`,
//! `template_contents`). Child rows carry a `position` column so declaration
//! order survives a round trip, and `ON DELETE CASCADE` removes them together
//! with their template. Inserts run in a single transaction, and reads run in
//! a repeatable-read snapshot so a template and its children are always seen
//! at the same point in time.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::enums::{Application, ClosedSet};
use super::repository::{RepositoryError, TemplateRepository};
use super::types::{Template, TemplateContent, TemplateField};

/// Schema applied by [`PostgresTemplateRepository::ensure_schema`]
pub const SCHEMA_SQL: &str = include_str!("../../migrations/0001_templates.sql");

type TemplateRow = (Uuid, String, String, DateTime<Utc>, DateTime<Utc>);
type FieldRow = (Uuid, Uuid, String, String, String, DateTime<Utc>, DateTime<Utc>);
type ContentRow = (Uuid, Uuid, String, String, String, DateTime<Utc>, DateTime<Utc>);

const TEMPLATE_COLUMNS: &str = "id, application, code, created_at, updated_at";

/// Issued first in every read transaction
const SNAPSHOT_ISOLATION: &str = "SET TRANSACTION ISOLATION LEVEL REPEATABLE READ";

/// PostgreSQL-based template repository.
pub struct PostgresTemplateRepository {
    pool: PgPool,
}

impl PostgresTemplateRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the tables if they do not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), RepositoryError> {
        sqlx::raw_sql(SCHEMA_SQL).execute(&self.pool).await?;
        tracing::info!("Template schema ensured");
        Ok(())
    }

    /// Begin a transaction whose statements all read the same snapshot.
    async fn snapshot(&self) -> Result<Transaction<'static, Postgres>, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(SNAPSHOT_ISOLATION).execute(&mut *tx).await?;
        Ok(tx)
    }

    /// Load children for the given template rows and build aggregates,
    /// preserving the order of `rows`.
    async fn assemble(
        conn: &mut PgConnection,
        rows: Vec<TemplateRow>,
    ) -> Result<Vec<Template>, RepositoryError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = rows.iter().map(|row| row.0).collect();

        let field_rows: Vec<FieldRow> = sqlx::query_as(
            r#"
            SELECT id, template_id, field, description, type, created_at, updated_at
            FROM template_fields
            WHERE template_id = ANY($1)
            ORDER BY template_id, position
            "#,
        )
        .bind(&ids)
        .fetch_all(&mut *conn)
        .await?;

        let content_rows: Vec<ContentRow> = sqlx::query_as(
            r#"
            SELECT id, template_id, language, subject, content, created_at, updated_at
            FROM template_contents
            WHERE template_id = ANY($1)
            ORDER BY template_id, position
            "#,
        )
        .bind(&ids)
        .fetch_all(&mut *conn)
        .await?;

        let mut fields: HashMap<Uuid, Vec<TemplateField>> = HashMap::new();
        for (id, template_id, field, description, field_type, created_at, updated_at) in field_rows
        {
            fields.entry(template_id).or_default().push(TemplateField {
                id,
                template_id,
                field,
                description,
                field_type: field_type.parse().map_err(corrupt)?,
                created_at,
                updated_at,
            });
        }

        let mut contents: HashMap<Uuid, Vec<TemplateContent>> = HashMap::new();
        for (id, template_id, language, subject, content, created_at, updated_at) in content_rows {
            contents.entry(template_id).or_default().push(TemplateContent {
                id,
                template_id,
                language: language.parse().map_err(corrupt)?,
                subject,
                content,
                created_at,
                updated_at,
            });
        }

        rows.into_iter()
            .map(|(id, application, code, created_at, updated_at)| {
                Ok(Template {
                    id,
                    application: application.parse().map_err(corrupt)?,
                    code,
                    created_at,
                    updated_at,
                    fields: fields.remove(&id).unwrap_or_default(),
                    contents: contents.remove(&id).unwrap_or_default(),
                })
            })
            .collect()
    }
}

fn corrupt(err: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::Corrupt(err.to_string())
}

fn map_insert_error(err: sqlx::Error, template: &Template) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            return RepositoryError::Conflict {
                application: template.application,
                code: template.code.clone(),
            };
        }
    }
    RepositoryError::Postgres(err)
}

#[async_trait]
impl TemplateRepository for PostgresTemplateRepository {
    async fn insert(&self, template: Template) -> Result<Template, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO templates (id, application, code, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(template.id)
        .bind(template.application.as_str())
        .bind(&template.code)
        .bind(template.created_at)
        .bind(template.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_insert_error(e, &template))?;

        for (position, field) in template.fields.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO template_fields
                    (id, template_id, position, field, description, type, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(field.id)
            .bind(template.id)
            .bind(position as i32)
            .bind(&field.field)
            .bind(&field.description)
            .bind(field.field_type.as_str())
            .bind(field.created_at)
            .bind(field.updated_at)
            .execute(&mut *tx)
            .await?;
        }

        for (position, content) in template.contents.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO template_contents
                    (id, template_id, position, language, subject, content, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(content.id)
            .bind(template.id)
            .bind(position as i32)
            .bind(content.language.as_str())
            .bind(&content.subject)
            .bind(&content.content)
            .bind(content.created_at)
            .bind(content.updated_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::debug!(
            template_id = %template.id,
            application = %template.application,
            code = %template.code,
            "Template inserted into PostgreSQL"
        );

        Ok(template)
    }

    async fn find_by_app_and_code(
        &self,
        application: Application,
        code: &str,
    ) -> Result<Option<Template>, RepositoryError> {
        let mut tx = self.snapshot().await?;

        let row: Option<TemplateRow> = sqlx::query_as(&format!(
            "SELECT {TEMPLATE_COLUMNS} FROM templates WHERE application = $1 AND code = $2"
        ))
        .bind(application.as_str())
        .bind(code)
        .fetch_optional(&mut *tx)
        .await?;

        let found = match row {
            Some(row) => Self::assemble(&mut tx, vec![row]).await?.pop(),
            None => None,
        };
        tx.commit().await?;
        Ok(found)
    }

    async fn list(
        &self,
        application: Option<Application>,
    ) -> Result<Vec<Template>, RepositoryError> {
        let mut tx = self.snapshot().await?;

        let rows: Vec<TemplateRow> = match application {
            Some(app) => {
                sqlx::query_as(&format!(
                    "SELECT {TEMPLATE_COLUMNS} FROM templates WHERE application = $1 ORDER BY code"
                ))
                .bind(app.as_str())
                .fetch_all(&mut *tx)
                .await?
            }
            None => {
                sqlx::query_as(&format!(
                    "SELECT {TEMPLATE_COLUMNS} FROM templates ORDER BY code"
                ))
                .fetch_all(&mut *tx)
                .await?
            }
        };

        let templates = Self::assemble(&mut tx, rows).await?;
        tx.commit().await?;
        Ok(templates)
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Template>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        // Lock the row so the children read below are the ones deleted
        let row: Option<TemplateRow> = sqlx::query_as(&format!(
            "SELECT {TEMPLATE_COLUMNS} FROM templates WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let Some(template) = Self::assemble(&mut tx, vec![row]).await?.pop() else {
            return Ok(None);
        };

        sqlx::query("DELETE FROM templates WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::debug!(template_id = %id, "Template deleted from PostgreSQL");
        Ok(Some(template))
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
