//! Validation error type

use serde::Serialize;
use thiserror::Error;

/// Message returned when the request root is not a JSON object.
pub const INVALID_PARAMS_MESSAGE: &str = "Invalid parameters";

/// Ordered list of validation messages, one per violated field.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("validation failed: {}", .errors.join("; "))]
pub struct ValidationErrors {
    pub errors: Vec<String>,
}

impl ValidationErrors {
    pub fn new(errors: Vec<String>) -> Self {
        Self { errors }
    }

    /// Single generic error for a malformed request root
    pub fn invalid_params() -> Self {
        Self::new(vec![INVALID_PARAMS_MESSAGE.to_string()])
    }

    /// `Ok(())` when no message was collected.
    pub fn check(errors: Vec<String>) -> Result<(), Self> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Self::new(errors))
        }
    }

    pub fn messages(&self) -> &[String] {
        &self.errors
    }

    pub fn into_messages(self) -> Vec<String> {
        self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}
