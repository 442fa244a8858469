//! Template endpoints.

use std::collections::HashMap;

use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use uuid::Uuid;

use super::params::{body_params, query_params};
use crate::error::{AppError, Result};
use crate::server::AppState;
use crate::template::{FormattedTemplate, Template, TemplateError, TemplateListResponse};

/// POST /v1/template - Create a template with its fields and contents
#[tracing::instrument(name = "http.create_template", skip(state, body))]
pub async fn create_template(
    State(state): State<AppState>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Template>)> {
    let params = body_params(body)?;
    let created = state.templates.create(&params).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /v1/template - List templates, optionally filtered by application
#[tracing::instrument(name = "http.list_templates", skip(state))]
pub async fn list_templates(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<TemplateListResponse>> {
    let templates = state.templates.list(&query_params(query)).await?;
    let total = templates.len();

    Ok(Json(TemplateListResponse { templates, total }))
}

/// GET /v1/template/formatted - Resolve a template for one language
#[tracing::instrument(name = "http.find_formatted_template", skip(state))]
pub async fn find_formatted_template(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<FormattedTemplate>> {
    let formatted = state.templates.find_formatted(&query_params(query)).await?;
    Ok(Json(formatted))
}

/// DELETE /v1/template/{id} - Delete a template and everything it owns
#[tracing::instrument(name = "http.delete_template", skip(state, id))]
pub async fn delete_template(
    State(state): State<AppState>,
    id: std::result::Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode> {
    // Ids that are not UUIDs cannot name an existing template
    let Ok(Path(id)) = id else {
        return Err(AppError::from(TemplateError::TemplateNotFound));
    };

    state.templates.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
