//! Rule variants and value kinds

use chrono::{DateTime, NaiveDate};
use serde_json::Value;

/// Value kinds a `Type` rule can require.
///
/// `Number`, `Boolean` and `Date` also accept their usual string spellings
/// (`"42"`, `"true"`, `"2024-05-01"`), since request payloads frequently
/// carry them as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    String,
    Number,
    Boolean,
    Date,
    Object,
    Array,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::String => "string",
            ValueKind::Number => "number",
            ValueKind::Boolean => "boolean",
            ValueKind::Date => "date",
            ValueKind::Object => "object",
            ValueKind::Array => "array",
        }
    }

    /// Does `value` conform to this kind?
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            ValueKind::String => value.is_string(),
            ValueKind::Number => match value {
                Value::Number(_) => true,
                Value::String(s) => parse_number(s).is_some(),
                _ => false,
            },
            ValueKind::Boolean => match value {
                Value::Bool(_) => true,
                Value::String(s) => s == "true" || s == "false",
                _ => false,
            },
            ValueKind::Date => value.as_str().is_some_and(is_date),
            ValueKind::Object => value.is_object(),
            ValueKind::Array => value.is_array(),
        }
    }

    /// Text form of a conforming value, as inserted into templates.
    pub fn printable(&self, value: &Value) -> String {
        match value {
            Value::String(s) if *self == ValueKind::Number => s.trim().to_string(),
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn is_date(s: &str) -> bool {
    DateTime::parse_from_rfc3339(s).is_ok() || NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

/// A single validation rule.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Required,
    Type(ValueKind),
    MinLength(usize),
    MaxLength(usize),
    MinItems(usize),
    OneOf(Vec<String>),
    Email,
}

/// Evaluation order of rules within one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Stage {
    Presence,
    Type,
    Constraint,
}

impl Rule {
    pub(crate) fn stage(&self) -> Stage {
        match self {
            Rule::Required => Stage::Presence,
            Rule::Type(_) => Stage::Type,
            _ => Stage::Constraint,
        }
    }

    /// Check a present (non-null) value, returning the violation message.
    pub(crate) fn check(&self, path: &str, value: &Value) -> Option<String> {
        match self {
            Rule::Required => None,
            Rule::Type(kind) => (!kind.matches(value)).then(|| {
                format!(
                    "{path} must be a `{}` type, but the final value was: `{value}`.",
                    kind.as_str()
                )
            }),
            Rule::MinLength(min) => value
                .as_str()
                .filter(|s| s.chars().count() < *min)
                .map(|_| format!("{path} must be at least {min} characters")),
            Rule::MaxLength(max) => value
                .as_str()
                .filter(|s| s.chars().count() > *max)
                .map(|_| format!("{path} must be at most {max} characters")),
            Rule::MinItems(min) => value
                .as_array()
                .filter(|items| items.len() < *min)
                .map(|_| format!("{path} field must have at least {min} items")),
            Rule::OneOf(allowed) => value
                .as_str()
                .filter(|s| !allowed.iter().any(|a| a == s))
                .map(|_| {
                    format!(
                        "{path} must be one of the following values: {}",
                        allowed.join(", ")
                    )
                }),
            Rule::Email => value
                .as_str()
                .filter(|s| s.parse::<lettre::Address>().is_err())
                .map(|_| format!("{path} must be a valid email")),
        }
    }

    pub(crate) fn required_message(path: &str) -> String {
        format!("{path} is a required field")
    }
}
