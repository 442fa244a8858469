//! Declarative request validation.
//!
//! Schemas are rule tables: every field carries an ordered list of [`Rule`]s
//! and, optionally, a nested object schema or an item schema for arrays. A
//! single interpreter walks the table and produces an ordered list of
//! human-readable messages addressed by field path (`fields[0].type`).
//!
//! For each field the interpreter checks presence, then type, then
//! bounds/enumeration, and stops at the first violated rule. Errors from
//! different fields are all collected, in declaration order.
//!
//! ```ignore
//! let schema = ObjectSchema::new()
//!     .field("code", FieldSchema::string().required().length(3, 100))
//!     .field("language", FieldSchema::string().required().one_of(["EN", "PT"]));
//!
//! schema.validate(&json!({ "code": "ab" }))?;
//! // Err(["code must be at least 3 characters", "language is a required field"])
//! ```

mod errors;
mod rules;
mod schema;

pub use errors::{ValidationErrors, INVALID_PARAMS_MESSAGE};
pub use rules::{Rule, ValueKind};
pub use schema::{FieldSchema, ObjectSchema, UnknownFieldPolicy};
