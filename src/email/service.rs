//! The send pipeline.
//!
//! A send request moves through `shape validated → template resolved →
//! extra data validated → interpolated → dispatched`. Any failure stops the
//! pipeline; nothing is retried.

use std::sync::Arc;
use std::time::Instant;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use super::mailer::{MailError, Mailer, OutgoingEmail};
use crate::config::TemplatesConfig;
use crate::metrics::EmailMetrics;
use crate::template::{
    find_formatted, limits, parse_params, replace_data, validate_extra_data, Application,
    ClosedSet, Escape, FindFormattedQuery, Language, TemplateError, TemplateRepository,
};
use crate::validation::{FieldSchema, ObjectSchema, UnknownFieldPolicy, ValidationErrors, ValueKind};

/// Body of `POST /v1/email`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailRequest {
    pub receiver_email: String,
    pub template_code: String,
    pub application: Application,
    pub language: Language,
    pub extra_data: Value,
}

#[derive(Debug, Error)]
pub enum SendError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Mail(#[from] MailError),
}

impl From<ValidationErrors> for SendError {
    fn from(errors: ValidationErrors) -> Self {
        SendError::Template(TemplateError::Validation(errors))
    }
}

/// Shape of a send request
pub fn send_email_schema() -> ObjectSchema {
    ObjectSchema::new()
        .field("receiverEmail", FieldSchema::string().required().email())
        .field(
            "templateCode",
            FieldSchema::string()
                .required()
                .length(limits::TEMPLATE_CODE.min, limits::TEMPLATE_CODE.max),
        )
        .field(
            "application",
            FieldSchema::string().required().one_of(Application::names()),
        )
        .field(
            "language",
            FieldSchema::string().required().one_of(Language::names()),
        )
        .field(
            "extraData",
            FieldSchema::of_kind(ValueKind::Object).required(),
        )
}

/// Renders templates with caller data and hands them to the mailer.
pub struct EmailService {
    templates: Arc<dyn TemplateRepository>,
    mailer: Arc<dyn Mailer>,
    unknown_fields: UnknownFieldPolicy,
    body_escape: Escape,
}

impl EmailService {
    pub fn new(
        templates: Arc<dyn TemplateRepository>,
        mailer: Arc<dyn Mailer>,
        settings: &TemplatesConfig,
    ) -> Self {
        Self {
            templates,
            mailer,
            unknown_fields: settings.unknown_fields,
            body_escape: if settings.escape_html {
                Escape::Html
            } else {
                Escape::None
            },
        }
    }

    pub fn mailer(&self) -> &Arc<dyn Mailer> {
        &self.mailer
    }

    /// Validate, resolve and render a send request without dispatching it.
    pub async fn render(&self, params: &Value) -> Result<OutgoingEmail, SendError> {
        send_email_schema().validate(params).inspect_err(|_| {
            EmailMetrics::record_rejected("invalid_request");
        })?;
        let request: SendEmailRequest = parse_params(params)?;

        let query = FindFormattedQuery {
            code: request.template_code,
            application: request.application,
            language: request.language,
        };
        let template = find_formatted(self.templates.as_ref(), &query)
            .await
            .inspect_err(|e| match e {
                TemplateError::TemplateNotFound => EmailMetrics::record_rejected("template_not_found"),
                TemplateError::ContentNotFound => EmailMetrics::record_rejected("content_not_found"),
                _ => {}
            })?;

        let data = validate_extra_data(&request.extra_data, &template.fields, self.unknown_fields)
            .inspect_err(|_| EmailMetrics::record_rejected("invalid_extra_data"))?;

        Ok(OutgoingEmail {
            to: request.receiver_email,
            subject: replace_data(&template.subject, &data, Escape::None),
            html: replace_data(&template.content, &data, self.body_escape),
        })
    }

    /// Run the full pipeline and dispatch the rendered email.
    #[tracing::instrument(name = "email.send", skip(self, params))]
    pub async fn send(&self, params: &Value) -> Result<OutgoingEmail, SendError> {
        let email = self.render(params).await?;

        let started = Instant::now();
        let result = self.mailer.send_mail(&email).await;
        EmailMetrics::observe_delivery(self.mailer.backend_name(), started.elapsed().as_secs_f64());

        match result {
            Ok(()) => {
                EmailMetrics::record_sent(self.mailer.backend_name());
                tracing::info!(
                    to = %email.to,
                    backend = self.mailer.backend_name(),
                    "Email dispatched"
                );
                Ok(email)
            }
            Err(e) => {
                EmailMetrics::record_failed(self.mailer.backend_name());
                tracing::error!(
                    error = %e,
                    to = %email.to,
                    backend = self.mailer.backend_name(),
                    "Email dispatch failed"
                );
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::email::MemoryMailer;
    use crate::template::{MemoryTemplateRepository, TemplateService};
    use serde_json::json;

    struct Fixture {
        service: EmailService,
        mailer: Arc<MemoryMailer>,
    }

    async fn fixture(settings: TemplatesConfig) -> Fixture {
        let repository: Arc<dyn TemplateRepository> = Arc::new(MemoryTemplateRepository::new());
        TemplateService::new(repository.clone())
            .create(&json!({
                "application": "UNIQUE_LOGIN_SYSTEM",
                "code": "confirm.email",
                "fields": [
                    { "field": "userName", "description": "Name of the user", "type": "STRING" },
                    { "field": "attempts", "description": "Login attempts", "type": "NUMBER" }
                ],
                "contents": [{
                    "language": "EN",
                    "subject": "Welcome {{userName}}",
                    "content": "<h1>Hi {{userName}}</h1><p>{{attempts}}</p>"
                }]
            }))
            .await
            .unwrap();

        let mailer = Arc::new(MemoryMailer::new());
        Fixture {
            service: EmailService::new(repository, mailer.clone(), &settings),
            mailer,
        }
    }

    fn send_params(extra_data: Value) -> Value {
        json!({
            "receiverEmail": "ada@example.com",
            "templateCode": "confirm.email",
            "application": "UNIQUE_LOGIN_SYSTEM",
            "language": "EN",
            "extraData": extra_data
        })
    }

    fn validation_messages(err: SendError) -> Vec<String> {
        match err {
            SendError::Template(TemplateError::Validation(errors)) => errors.into_messages(),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_send_renders_and_dispatches() {
        let f = fixture(TemplatesConfig::default()).await;
        let email = f
            .service
            .send(&send_params(json!({ "userName": "Ada", "attempts": 3 })))
            .await
            .unwrap();

        assert_eq!(email.subject, "Welcome Ada");
        assert_eq!(email.html, "<h1>Hi Ada</h1><p>3</p>");
        assert_eq!(f.mailer.sent(), vec![email]);
    }

    #[tokio::test]
    async fn test_body_values_are_escaped_subject_is_not() {
        let f = fixture(TemplatesConfig::default()).await;
        let email = f
            .service
            .render(&send_params(json!({ "userName": "<b>Ada</b>", "attempts": 1 })))
            .await
            .unwrap();
        assert_eq!(email.subject, "Welcome <b>Ada</b>");
        assert_eq!(email.html, "<h1>Hi &lt;b&gt;Ada&lt;/b&gt;</h1><p>1</p>");

        let raw = fixture(TemplatesConfig {
            escape_html: false,
            ..TemplatesConfig::default()
        })
        .await;
        let email = raw
            .service
            .render(&send_params(json!({ "userName": "<b>Ada</b>", "attempts": 1 })))
            .await
            .unwrap();
        assert_eq!(email.html, "<h1>Hi <b>Ada</b></h1><p>1</p>");
    }

    #[tokio::test]
    async fn test_missing_extra_data_field() {
        let f = fixture(TemplatesConfig::default()).await;
        let err = f
            .service
            .send(&send_params(json!({ "attempts": 1 })))
            .await
            .unwrap_err();
        assert_eq!(validation_messages(err), ["userName is a required field"]);
        assert_eq!(f.mailer.count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_code() {
        let f = fixture(TemplatesConfig::default()).await;
        let mut params = send_params(json!({ "userName": "Ada", "attempts": 1 }));
        params["templateCode"] = json!("missing.code");

        let err = f.service.send(&params).await.unwrap_err();
        assert!(matches!(err, SendError::Template(TemplateError::TemplateNotFound)));
    }

    #[tokio::test]
    async fn test_missing_language_content() {
        let f = fixture(TemplatesConfig::default()).await;
        let mut params = send_params(json!({ "userName": "Ada", "attempts": 1 }));
        params["language"] = json!("PT");

        let err = f.service.send(&params).await.unwrap_err();
        assert!(matches!(err, SendError::Template(TemplateError::ContentNotFound)));
    }

    #[tokio::test]
    async fn test_request_shape() {
        let f = fixture(TemplatesConfig::default()).await;
        let err = f
            .service
            .send(&json!({
                "receiverEmail": "not-an-email",
                "templateCode": "ab",
                "application": "UNIQUE_LOGIN_SYSTEM",
                "language": "FR",
                "extraData": []
            }))
            .await
            .unwrap_err();

        assert_eq!(
            validation_messages(err),
            [
                "receiverEmail must be a valid email",
                "templateCode must be at least 3 characters",
                "language must be one of the following values: EN, PT, ES",
                "extraData must be a `object` type, but the final value was: `[]`.",
            ]
        );

        let err = f.service.send(&json!("nope")).await.unwrap_err();
        assert_eq!(validation_messages(err), ["Invalid parameters"]);
    }

    #[tokio::test]
    async fn test_unknown_extra_data_keys() {
        let f = fixture(TemplatesConfig::default()).await;
        let params = send_params(json!({ "userName": "Ada", "attempts": 1, "admin": true }));
        let err = f.service.send(&params).await.unwrap_err();
        assert_eq!(validation_messages(err), ["admin is not a declared field"]);

        let lenient = fixture(TemplatesConfig {
            unknown_fields: UnknownFieldPolicy::Ignore,
            ..TemplatesConfig::default()
        })
        .await;
        assert!(lenient.service.send(&params).await.is_ok());
    }

    #[tokio::test]
    async fn test_delivery_failure() {
        let f = fixture(TemplatesConfig::default()).await;
        f.mailer.set_failing(true);

        let err = f
            .service
            .send(&send_params(json!({ "userName": "Ada", "attempts": 1 })))
            .await
            .unwrap_err();
        assert!(matches!(err, SendError::Mail(MailError::Transport(_))));
    }
}
