//! Schema tree and its interpreter

use serde::Deserialize;
use serde_json::{Map, Value};

use super::errors::ValidationErrors;
use super::rules::{Rule, Stage, ValueKind};

/// What to do with object keys that the schema does not declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownFieldPolicy {
    /// Report every undeclared key as a violation
    #[default]
    Reject,
    /// Silently drop undeclared keys
    Ignore,
}

#[derive(Debug, Clone)]
enum Children {
    None,
    Object(ObjectSchema),
    Items(Box<FieldSchema>),
}

/// Rules for one field, plus its nested schema if it is an object or array.
#[derive(Debug, Clone)]
pub struct FieldSchema {
    rules: Vec<Rule>,
    children: Children,
}

impl FieldSchema {
    pub fn of_kind(kind: ValueKind) -> Self {
        Self {
            rules: vec![Rule::Type(kind)],
            children: Children::None,
        }
    }

    pub fn string() -> Self {
        Self::of_kind(ValueKind::String)
    }

    pub fn object(schema: ObjectSchema) -> Self {
        Self {
            rules: vec![Rule::Type(ValueKind::Object)],
            children: Children::Object(schema),
        }
    }

    pub fn array(items: FieldSchema) -> Self {
        Self {
            rules: vec![Rule::Type(ValueKind::Array)],
            children: Children::Items(Box::new(items)),
        }
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn required(self) -> Self {
        self.rule(Rule::Required)
    }

    pub fn min_length(self, min: usize) -> Self {
        self.rule(Rule::MinLength(min))
    }

    pub fn max_length(self, max: usize) -> Self {
        self.rule(Rule::MaxLength(max))
    }

    /// Inclusive character-length bounds
    pub fn length(self, min: usize, max: usize) -> Self {
        self.min_length(min).max_length(max)
    }

    pub fn min_items(self, min: usize) -> Self {
        self.rule(Rule::MinItems(min))
    }

    pub fn one_of<I, S>(self, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rule(Rule::OneOf(allowed.into_iter().map(Into::into).collect()))
    }

    pub fn email(self) -> Self {
        self.rule(Rule::Email)
    }

    fn is_required(&self) -> bool {
        self.rules.iter().any(|r| matches!(r, Rule::Required))
    }

    fn validate(&self, path: &str, value: Option<&Value>, errors: &mut Vec<String>) {
        let value = match value {
            Some(v) if !v.is_null() => v,
            _ => {
                if self.is_required() {
                    errors.push(Rule::required_message(path));
                }
                return;
            }
        };

        for stage in [Stage::Type, Stage::Constraint] {
            for rule in self.rules.iter().filter(|r| r.stage() == stage) {
                if let Some(message) = rule.check(path, value) {
                    errors.push(message);
                    return;
                }
            }
        }

        match &self.children {
            Children::None => {}
            Children::Object(schema) => {
                if let Some(map) = value.as_object() {
                    schema.validate_fields(path, map, errors);
                }
            }
            Children::Items(item) => {
                if let Some(values) = value.as_array() {
                    for (index, element) in values.iter().enumerate() {
                        item.validate(&format!("{path}[{index}]"), Some(element), errors);
                    }
                }
            }
        }
    }
}

/// Ordered field declarations of a JSON object.
#[derive(Debug, Clone)]
pub struct ObjectSchema {
    fields: Vec<(String, FieldSchema)>,
    unknown_fields: UnknownFieldPolicy,
}

impl Default for ObjectSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectSchema {
    /// An empty schema that ignores undeclared keys
    pub fn new() -> Self {
        Self {
            fields: Vec::new(),
            unknown_fields: UnknownFieldPolicy::Ignore,
        }
    }

    pub fn field(mut self, name: impl Into<String>, schema: FieldSchema) -> Self {
        self.fields.push((name.into(), schema));
        self
    }

    pub fn unknown_fields(mut self, policy: UnknownFieldPolicy) -> Self {
        self.unknown_fields = policy;
        self
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Validate a request root.
    ///
    /// A root that is not a JSON object yields the single
    /// [`INVALID_PARAMS_MESSAGE`](super::INVALID_PARAMS_MESSAGE) error.
    pub fn validate(&self, value: &Value) -> Result<(), ValidationErrors> {
        let Some(map) = value.as_object() else {
            return Err(ValidationErrors::invalid_params());
        };

        let mut errors = Vec::new();
        self.validate_fields("", map, &mut errors);
        ValidationErrors::check(errors)
    }

    fn validate_fields(&self, prefix: &str, map: &Map<String, Value>, errors: &mut Vec<String>) {
        for (name, schema) in &self.fields {
            schema.validate(&join_path(prefix, name), map.get(name), errors);
        }

        if self.unknown_fields == UnknownFieldPolicy::Reject {
            for key in map.keys() {
                if !self.fields.iter().any(|(name, _)| name == key) {
                    errors.push(format!("{} is not a declared field", join_path(prefix, key)));
                }
            }
        }
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item_schema() -> ObjectSchema {
        ObjectSchema::new()
            .field("field", FieldSchema::string().required().length(1, 10))
            .field(
                "type",
                FieldSchema::string().required().one_of(["STRING", "NUMBER"]),
            )
    }

    fn schema() -> ObjectSchema {
        ObjectSchema::new()
            .field("code", FieldSchema::string().required().length(3, 8))
            .field(
                "fields",
                FieldSchema::array(FieldSchema::object(item_schema()).required())
                    .required()
                    .min_items(1),
            )
    }

    fn messages(value: Value) -> Vec<String> {
        schema().validate(&value).unwrap_err().into_messages()
    }

    #[test]
    fn test_valid_input_passes() {
        let value = json!({ "code": "abcd", "fields": [{ "field": "name", "type": "STRING" }] });
        assert!(schema().validate(&value).is_ok());
    }

    #[test]
    fn test_non_object_root_short_circuits() {
        for root in [json!(""), json!(12), json!([]), Value::Null] {
            let err = schema().validate(&root).unwrap_err();
            assert_eq!(err.messages(), ["Invalid parameters"]);
        }
    }

    #[test]
    fn test_missing_fields_in_declaration_order() {
        assert_eq!(
            messages(json!({})),
            vec!["code is a required field", "fields is a required field"]
        );
    }

    #[test]
    fn test_null_counts_as_missing() {
        assert_eq!(
            messages(json!({ "code": null, "fields": [{ "field": "a", "type": "STRING" }] })),
            vec!["code is a required field"]
        );
    }

    #[test]
    fn test_type_failure_stops_field_evaluation() {
        assert_eq!(
            messages(json!({ "code": 12, "fields": [{ "field": "a", "type": "STRING" }] })),
            vec!["code must be a `string` type, but the final value was: `12`."]
        );
    }

    #[test]
    fn test_length_bounds() {
        let base = json!([{ "field": "a", "type": "STRING" }]);
        assert_eq!(
            messages(json!({ "code": "ab", "fields": base })),
            vec!["code must be at least 3 characters"]
        );
        assert_eq!(
            messages(json!({ "code": "abcdefghi", "fields": base })),
            vec!["code must be at most 8 characters"]
        );
    }

    #[test]
    fn test_empty_array() {
        assert_eq!(
            messages(json!({ "code": "abcd", "fields": [] })),
            vec!["fields field must have at least 1 items"]
        );
    }

    #[test]
    fn test_nested_paths() {
        assert_eq!(
            messages(json!({ "code": "abcd", "fields": [123] })),
            vec!["fields[0] must be a `object` type, but the final value was: `123`."]
        );
        assert_eq!(
            messages(json!({
                "code": "abcd",
                "fields": [
                    { "field": "ok", "type": "STRING" },
                    { "type": "DATE" }
                ]
            })),
            vec![
                "fields[1].field is a required field",
                "fields[1].type must be one of the following values: STRING, NUMBER",
            ]
        );
    }

    #[test]
    fn test_one_error_per_field_across_fields() {
        assert_eq!(
            messages(json!({ "code": 1, "fields": 2 })),
            vec![
                "code must be a `string` type, but the final value was: `1`.",
                "fields must be a `array` type, but the final value was: `2`.",
            ]
        );
    }

    #[test]
    fn test_optional_field_skipped_when_absent() {
        let schema = ObjectSchema::new().field("note", FieldSchema::string().max_length(2));
        assert!(schema.validate(&json!({})).is_ok());
        assert!(schema.validate(&json!({ "note": "abc" })).is_err());
    }

    #[test]
    fn test_unknown_fields_policy() {
        let base = ObjectSchema::new().field("name", FieldSchema::string().required());
        let value = json!({ "name": "x", "extra": 1 });

        assert!(base.clone().validate(&value).is_ok());

        let err = base
            .unknown_fields(UnknownFieldPolicy::Reject)
            .validate(&value)
            .unwrap_err();
        assert_eq!(err.messages(), ["extra is not a declared field"]);
    }
}
