//! Template lookup by (application, code, language)

use super::repository::TemplateRepository;
use super::types::{
    FindFormattedQuery, FormattedField, FormattedTemplate, TemplateError, TemplateResult,
};

/// Resolve the content of a template for one language.
///
/// Lookup is exact; there is no fallback to another language.
pub async fn find_formatted(
    repository: &dyn TemplateRepository,
    query: &FindFormattedQuery,
) -> TemplateResult<FormattedTemplate> {
    let template = repository
        .find_by_app_and_code(query.application, &query.code)
        .await?
        .ok_or(TemplateError::TemplateNotFound)?;

    let content = template
        .content_for(query.language)
        .ok_or(TemplateError::ContentNotFound)?;

    tracing::debug!(
        template_id = %template.id,
        code = %template.code,
        language = %query.language,
        "Template resolved"
    );

    Ok(FormattedTemplate {
        fields: template.fields.iter().map(FormattedField::from).collect(),
        subject: content.subject.clone(),
        content: content.content.clone(),
    })
}
