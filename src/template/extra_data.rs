//! Validation of caller-supplied extra data against declared fields.

use std::collections::HashMap;

use serde_json::Value;

use super::types::FormattedField;
use crate::validation::{FieldSchema, ObjectSchema, UnknownFieldPolicy, ValidationErrors};

/// Validated values keyed by field name, already in printable form
pub type ExtraData = HashMap<String, String>;

/// Build the rule table for a template's field declarations.
pub fn extra_data_schema(fields: &[FormattedField], policy: UnknownFieldPolicy) -> ObjectSchema {
    fields
        .iter()
        .fold(ObjectSchema::new(), |schema, field| {
            schema.field(
                field.field.clone(),
                FieldSchema::of_kind(field.field_type.value_kind()).required(),
            )
        })
        .unknown_fields(policy)
}

/// Check `extra_data` against `fields` and convert it to printable values.
///
/// Every declared field is required and must conform to its declared type.
/// Undeclared keys are rejected or dropped according to `policy`. All
/// violations are reported together, declared fields first.
pub fn validate_extra_data(
    extra_data: &Value,
    fields: &[FormattedField],
    policy: UnknownFieldPolicy,
) -> Result<ExtraData, ValidationErrors> {
    extra_data_schema(fields, policy).validate(extra_data)?;

    let Some(values) = extra_data.as_object() else {
        return Err(ValidationErrors::invalid_params());
    };

    Ok(fields
        .iter()
        .filter_map(|field| {
            values
                .get(&field.field)
                .map(|value| (field.field.clone(), field.field_type.printable(value)))
        })
        .collect())
}
