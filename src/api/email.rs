//! Email sending endpoint.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use super::params::body_params;
use crate::error::Result;
use crate::server::AppState;

/// POST /v1/email - Render a template and dispatch it
#[tracing::instrument(name = "http.send_email", skip(state, body))]
pub async fn send_email(
    State(state): State<AppState>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<StatusCode> {
    let params = body_params(body)?;
    state.email.send(&params).await?;
    Ok(StatusCode::NO_CONTENT)
}
