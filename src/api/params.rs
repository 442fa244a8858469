//! Request parameter extraction shared by handlers.
//!
//! Handlers validate raw JSON against rule tables, so extraction only has to
//! produce a `serde_json::Value`.

use std::collections::HashMap;

use axum::{extract::rejection::JsonRejection, http::StatusCode, Json};
use serde_json::{Map, Value};

use crate::error::AppError;
use crate::validation::ValidationErrors;

/// Unwrap a JSON body. Unparseable bodies yield the generic invalid-params error.
pub fn body_params(body: Result<Json<Value>, JsonRejection>) -> Result<Value, AppError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            Err(AppError::PayloadTooLarge(rejection.body_text()))
        }
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Rejected request body");
            Err(ValidationErrors::invalid_params().into())
        }
    }
}

/// Turn query-string pairs into a JSON object of strings.
pub fn query_params(query: HashMap<String, String>) -> Value {
    Value::Object(
        query
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect::<Map<String, Value>>(),
    )
}
