//! Email template system.
//!
//! This module provides:
//! - Template aggregates (fields + per-language contents) and their closed enums
//! - Repository backends (in-memory, PostgreSQL, read-through cache)
//! - Resolution of a template for one language
//! - Validation of send-time extra data against declared fields
//! - `{{name}}` placeholder substitution
//!
//! # Example
//!
//! ```ignore
//! let service = TemplateService::new(create_template_repository(&settings.templates, None));
//!
//! service.create(&json!({
//!     "application": "UNIQUE_LOGIN_SYSTEM",
//!     "code": "confirm.email",
//!     "fields": [{ "field": "userName", "description": "Name", "type": "STRING" }],
//!     "contents": [{ "language": "EN", "subject": "Welcome {{userName}}", "content": "<h1>Hi {{userName}}</h1>" }]
//! })).await?;
//!
//! let formatted = service.find_formatted(&json!({
//!     "code": "confirm.email",
//!     "application": "UNIQUE_LOGIN_SYSTEM",
//!     "language": "EN"
//! })).await?;
//!
//! let data = validate_extra_data(&json!({ "userName": "Ada" }), &formatted.fields, UnknownFieldPolicy::Reject)?;
//! assert_eq!(replace_data(&formatted.subject, &data, Escape::None), "Welcome Ada");
//! ```

mod cached_repository;
mod enums;
mod extra_data;
mod factory;
pub mod limits;
mod memory_repository;
mod postgres_repository;
mod repository;
mod resolver;
mod service;
mod substitution;
mod types;

pub use cached_repository::CachedTemplateRepository;
pub use enums::{Application, ClosedSet, FieldType, Language, UnknownVariant};
pub use extra_data::{extra_data_schema, validate_extra_data, ExtraData};
pub use factory::create_template_repository;
pub use memory_repository::MemoryTemplateRepository;
pub use postgres_repository::{PostgresTemplateRepository, SCHEMA_SQL};
pub use repository::{RepositoryError, TemplateRepository};
pub use resolver::find_formatted;
pub use service::{create_template_schema, find_formatted_schema, TemplateService};
pub(crate) use service::parse_params;
pub use substitution::{placeholders, replace_data, Escape};
pub use types::{
    CreateContentRequest, CreateFieldRequest, CreateTemplateRequest, FindFormattedQuery,
    FormattedField, FormattedTemplate, Template, TemplateContent, TemplateError, TemplateField,
    TemplateListResponse, TemplateResult,
};
