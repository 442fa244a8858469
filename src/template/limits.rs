//! Length limits for template attributes.
//!
//! Shared by the create and find/send request schemas and mirrored by the
//! column sizes in `migrations/0001_templates.sql`.

use super::enums::{ClosedSet, Language};

/// Inclusive character-length bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min: usize,
    pub max: usize,
}

pub const TEMPLATE_CODE: Bounds = Bounds { min: 3, max: 100 };

pub const FIELD_NAME: Bounds = Bounds { min: 1, max: 50 };

pub const FIELD_DESCRIPTION: Bounds = Bounds { min: 1, max: 250 };

pub const CONTENT_SUBJECT: Bounds = Bounds { min: 1, max: 150 };

pub const CONTENT_BODY: Bounds = Bounds { min: 1, max: 20_000 };

/// Worst-case JSON size of one character: a surrogate pair written as two `\uXXXX` escapes
const ESCAPED_CHAR_BYTES: usize = 12;

/// Room for keys, fields and other parts of a request besides the contents
const ENVELOPE_BYTES: usize = 256 * 1024;

/// Largest request body accepted by the API.
///
/// Large enough for a create request carrying a content for every language
/// with subject and body at their maximum length, fully escaped.
pub const MAX_REQUEST_BYTES: usize = <Language as ClosedSet>::ALL.len()
    * (CONTENT_SUBJECT.max + CONTENT_BODY.max)
    * ESCAPED_CHAR_BYTES
    + ENVELOPE_BYTES;
