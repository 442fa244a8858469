//! Closed enumerations shared by template creation and email sending.
//!
//! Each enum exposes its full value table through [`ClosedSet::ALL`]. The
//! validation schemas derive their `one_of` rules from these tables, so the
//! values accepted at create time and at send time can never drift apart.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::validation::ValueKind;

/// A closed, process-wide set of string-named values.
pub trait ClosedSet: Sized + Copy + 'static {
    const ALL: &'static [Self];

    fn as_str(&self) -> &'static str;

    /// Wire names of every member, in declaration order
    fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|v| v.as_str()).collect()
    }

    fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.as_str() == s)
    }
}

/// Error returned when a string names no member of a closed set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! closed_set_impls {
    ($ty:ident, $kind:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$ty as ClosedSet>::parse(s).ok_or_else(|| UnknownVariant {
                    kind: $kind,
                    value: s.to_string(),
                })
            }
        }
    };
}

/// Applications that own templates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Application {
    UniqueLoginSystem,
}

impl ClosedSet for Application {
    const ALL: &'static [Self] = &[Application::UniqueLoginSystem];

    fn as_str(&self) -> &'static str {
        match self {
            Application::UniqueLoginSystem => "UNIQUE_LOGIN_SYSTEM",
        }
    }
}

closed_set_impls!(Application, "application");

/// Content languages. Lookup is exact, there is no fallback between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "EN")]
    En,
    #[serde(rename = "PT")]
    Pt,
    #[serde(rename = "ES")]
    Es,
}

impl ClosedSet for Language {
    const ALL: &'static [Self] = &[Language::En, Language::Pt, Language::Es];

    fn as_str(&self) -> &'static str {
        match self {
            Language::En => "EN",
            Language::Pt => "PT",
            Language::Es => "ES",
        }
    }
}

closed_set_impls!(Language, "language");

/// Declared data type of a template field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldType {
    String,
    Number,
    Date,
    Boolean,
}

impl ClosedSet for FieldType {
    const ALL: &'static [Self] = &[
        FieldType::String,
        FieldType::Number,
        FieldType::Date,
        FieldType::Boolean,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "STRING",
            FieldType::Number => "NUMBER",
            FieldType::Date => "DATE",
            FieldType::Boolean => "BOOLEAN",
        }
    }
}

closed_set_impls!(FieldType, "field type");

impl FieldType {
    /// Value kind that supplied data must conform to
    pub fn value_kind(&self) -> ValueKind {
        match self {
            FieldType::String => ValueKind::String,
            FieldType::Number => ValueKind::Number,
            FieldType::Date => ValueKind::Date,
            FieldType::Boolean => ValueKind::Boolean,
        }
    }

    pub fn conforms(&self, value: &serde_json::Value) -> bool {
        self.value_kind().matches(value)
    }

    pub fn printable(&self, value: &serde_json::Value) -> String {
        self.value_kind().printable(value)
    }
}
