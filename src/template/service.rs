//! Template management: create, resolve, list and delete.
//!
//! Every entry point takes the raw request parameters as JSON so that shape
//! violations are reported through the rule tables below, with one message
//! per offending field, before anything is deserialized.

use std::collections::HashSet;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

use super::enums::{Application, ClosedSet, FieldType, Language};
use super::limits::{
    Bounds, CONTENT_BODY, CONTENT_SUBJECT, FIELD_DESCRIPTION, FIELD_NAME, TEMPLATE_CODE,
};
use super::repository::TemplateRepository;
use super::resolver;
use super::substitution::placeholders;
use super::types::{
    CreateTemplateRequest, FindFormattedQuery, FormattedTemplate, Template, TemplateError,
    TemplateResult,
};
use crate::metrics::TEMPLATES_CREATED_TOTAL;
use crate::validation::{FieldSchema, ObjectSchema, ValidationErrors};

fn bounded_string(bounds: Bounds) -> FieldSchema {
    FieldSchema::string()
        .required()
        .length(bounds.min, bounds.max)
}

fn closed_set<T: ClosedSet>() -> FieldSchema {
    FieldSchema::string().one_of(T::names())
}

/// Shape of a create request
pub fn create_template_schema() -> ObjectSchema {
    let field = ObjectSchema::new()
        .field("field", bounded_string(FIELD_NAME))
        .field("description", bounded_string(FIELD_DESCRIPTION))
        .field("type", closed_set::<FieldType>().required());

    let content = ObjectSchema::new()
        .field("language", closed_set::<Language>().required())
        .field("subject", bounded_string(CONTENT_SUBJECT))
        .field("content", bounded_string(CONTENT_BODY));

    ObjectSchema::new()
        .field("application", closed_set::<Application>().required())
        .field("code", bounded_string(TEMPLATE_CODE))
        .field(
            "fields",
            FieldSchema::array(FieldSchema::object(field).required())
                .required()
                .min_items(1),
        )
        .field(
            "contents",
            FieldSchema::array(FieldSchema::object(content).required())
                .required()
                .min_items(1),
        )
}

/// Shape of a formatted-template lookup
pub fn find_formatted_schema() -> ObjectSchema {
    ObjectSchema::new()
        .field("code", bounded_string(TEMPLATE_CODE))
        .field("application", closed_set::<Application>().required())
        .field("language", closed_set::<Language>().required())
}

fn list_schema() -> ObjectSchema {
    ObjectSchema::new().field("application", closed_set::<Application>())
}

/// Deserialize parameters that already passed their schema.
pub(crate) fn parse_params<T: DeserializeOwned>(params: &Value) -> Result<T, ValidationErrors> {
    serde_json::from_value(params.clone()).map_err(|e| {
        tracing::debug!(error = %e, "Validated parameters failed to deserialize");
        ValidationErrors::invalid_params()
    })
}

/// Cross-field checks a per-field rule table cannot express.
fn semantic_errors(request: &CreateTemplateRequest) -> Vec<String> {
    let mut errors = Vec::new();

    let mut declared = HashSet::new();
    for (index, field) in request.fields.iter().enumerate() {
        if !declared.insert(field.field.as_str()) {
            errors.push(format!(
                "fields[{index}].field must be unique within the template"
            ));
        }
    }

    let mut languages = HashSet::new();
    for (index, content) in request.contents.iter().enumerate() {
        if !languages.insert(content.language) {
            errors.push(format!(
                "contents[{index}].language must be unique within the template"
            ));
        }
    }

    for (index, content) in request.contents.iter().enumerate() {
        for (attribute, text) in [("subject", &content.subject), ("content", &content.content)] {
            let mut reported = HashSet::new();
            for name in placeholders(text) {
                if !declared.contains(name) && reported.insert(name) {
                    errors.push(format!(
                        "contents[{index}].{attribute} references undeclared field `{name}`"
                    ));
                }
            }
        }
    }

    errors
}

/// Template management service
pub struct TemplateService {
    repository: Arc<dyn TemplateRepository>,
}

impl TemplateService {
    pub fn new(repository: Arc<dyn TemplateRepository>) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &dyn TemplateRepository {
        self.repository.as_ref()
    }

    /// Validate and persist a new template aggregate.
    #[tracing::instrument(name = "template.create", skip(self, params))]
    pub async fn create(&self, params: &Value) -> TemplateResult<Template> {
        create_template_schema().validate(params)?;
        let request: CreateTemplateRequest = parse_params(params)?;
        ValidationErrors::check(semantic_errors(&request))?;

        let created = self.repository.insert(request.into()).await?;
        TEMPLATES_CREATED_TOTAL.inc();

        tracing::info!(
            template_id = %created.id,
            application = %created.application,
            code = %created.code,
            fields = created.fields.len(),
            contents = created.contents.len(),
            "Template created"
        );

        Ok(created)
    }

    /// Validate lookup parameters and resolve the template content.
    #[tracing::instrument(name = "template.find_formatted", skip(self, params))]
    pub async fn find_formatted(&self, params: &Value) -> TemplateResult<FormattedTemplate> {
        find_formatted_schema().validate(params)?;
        let query: FindFormattedQuery = parse_params(params)?;
        resolver::find_formatted(self.repository.as_ref(), &query).await
    }

    /// List templates ordered by code, optionally filtered by `application`.
    pub async fn list(&self, params: &Value) -> TemplateResult<Vec<Template>> {
        list_schema().validate(params)?;
        let application = match params.get("application").and_then(Value::as_str) {
            Some(name) => Application::parse(name),
            None => None,
        };
        Ok(self.repository.list(application).await?)
    }

    pub async fn delete(&self, id: Uuid) -> TemplateResult<Template> {
        let deleted = self
            .repository
            .delete(id)
            .await?
            .ok_or(TemplateError::TemplateNotFound)?;

        tracing::info!(
            template_id = %deleted.id,
            code = %deleted.code,
            "Template deleted"
        );
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::memory_repository::MemoryTemplateRepository;
    use serde_json::json;

    fn service() -> TemplateService {
        TemplateService::new(Arc::new(MemoryTemplateRepository::new()))
    }

    fn confirm_email() -> Value {
        json!({
            "application": "UNIQUE_LOGIN_SYSTEM",
            "code": "confirm.email",
            "fields": [
                { "field": "userName", "description": "Name of the user", "type": "STRING" }
            ],
            "contents": [
                {
                    "language": "EN",
                    "subject": "Welcome {{userName}}",
                    "content": "<h1>Hi {{userName}}</h1>"
                }
            ]
        })
    }

    fn create_errors(params: Value) -> Vec<String> {
        create_template_schema()
            .validate(&params)
            .unwrap_err()
            .into_messages()
    }

    #[test]
    fn test_valid_create_params_pass() {
        assert!(create_template_schema().validate(&confirm_email()).is_ok());
    }

    #[test]
    fn test_missing_create_params() {
        assert_eq!(
            create_errors(json!({})),
            vec![
                "application is a required field",
                "code is a required field",
                "fields is a required field",
                "contents is a required field",
            ]
        );
    }

    #[test]
    fn test_create_param_violations() {
        let mut params = confirm_email();
        params["application"] = json!("OTHER");
        params["code"] = json!("ab");
        params["fields"] = json!([]);
        params["contents"][0]["language"] = json!("FR");
        params["contents"][0]["subject"] = json!(42);

        assert_eq!(
            create_errors(params),
            vec![
                "application must be one of the following values: UNIQUE_LOGIN_SYSTEM",
                "code must be at least 3 characters",
                "fields field must have at least 1 items",
                "contents[0].language must be one of the following values: EN, PT, ES",
                "contents[0].subject must be a `string` type, but the final value was: `42`.",
            ]
        );
    }

    #[test]
    fn test_field_length_limits() {
        let mut params = confirm_email();
        params["fields"][0]["field"] = json!("x".repeat(51));
        params["fields"][0]["description"] = json!("");
        params["fields"][0]["type"] = json!("TEXT");

        assert_eq!(
            create_errors(params),
            vec![
                "fields[0].field must be at most 50 characters",
                "fields[0].description must be at least 1 characters",
                "fields[0].type must be one of the following values: STRING, NUMBER, DATE, BOOLEAN",
            ]
        );
    }

    #[tokio::test]
    async fn test_create_and_find_formatted() {
        let service = service();
        let created = service.create(&confirm_email()).await.unwrap();
        assert_eq!(created.code, "confirm.email");
        assert_eq!(created.fields[0].template_id, created.id);

        let formatted = service
            .find_formatted(&json!({
                "code": "confirm.email",
                "application": "UNIQUE_LOGIN_SYSTEM",
                "language": "EN"
            }))
            .await
            .unwrap();
        assert_eq!(formatted.subject, "Welcome {{userName}}");
        assert_eq!(formatted.fields[0].field, "userName");
    }

    #[tokio::test]
    async fn test_duplicate_template_conflicts() {
        let service = service();
        service.create(&confirm_email()).await.unwrap();
        let err = service.create(&confirm_email()).await.unwrap_err();
        assert!(matches!(err, TemplateError::AlreadyExists));
    }

    #[tokio::test]
    async fn test_semantic_checks_reported_together() {
        let mut params = confirm_email();
        params["fields"] = json!([
            { "field": "userName", "description": "Name", "type": "STRING" },
            { "field": "userName", "description": "Again", "type": "NUMBER" }
        ]);
        params["contents"] = json!([
            { "language": "EN", "subject": "Hi {{nick}}", "content": "{{code}} {{code}}" },
            { "language": "EN", "subject": "Hello", "content": "{{userName}}" }
        ]);

        let err = service().create(&params).await.unwrap_err();
        let errors = match err {
            TemplateError::Validation(errors) => errors,
            other => panic!("expected validation error, got {other:?}"),
        };
        assert_eq!(
            errors.messages(),
            [
                "fields[1].field must be unique within the template",
                "contents[1].language must be unique within the template",
                "contents[0].subject references undeclared field `nick`",
                "contents[0].content references undeclared field `code`",
            ]
        );
    }

    #[tokio::test]
    async fn test_find_formatted_validates_params() {
        let err = service()
            .find_formatted(&json!({ "code": 123, "application": "UNIQUE_LOGIN_SYSTEM" }))
            .await
            .unwrap_err();
        let errors = match err {
            TemplateError::Validation(errors) => errors,
            other => panic!("expected validation error, got {other:?}"),
        };
        assert_eq!(
            errors.messages(),
            [
                "code must be a `string` type, but the final value was: `123`.",
                "language is a required field",
            ]
        );
    }

    #[tokio::test]
    async fn test_list_and_delete() {
        let service = service();
        let created = service.create(&confirm_email()).await.unwrap();

        let listed = service
            .list(&json!({ "application": "UNIQUE_LOGIN_SYSTEM" }))
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);

        let err = service.list(&json!({ "application": "NOPE" })).await.unwrap_err();
        assert!(matches!(err, TemplateError::Validation(_)));

        service.delete(created.id).await.unwrap();
        assert!(service.list(&json!({})).await.unwrap().is_empty());

        let err = service.delete(created.id).await.unwrap_err();
        assert!(matches!(err, TemplateError::TemplateNotFound));
    }
}
