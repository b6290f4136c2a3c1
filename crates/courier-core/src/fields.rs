//! Static field schemas for destination actions.
//!
//! Each action declares, up front, the fields it maps from a normalized
//! event: value type, whether the field is required, a human description
//! shown in the mapping UI, and an optional default, either a literal or an
//! extraction path into the event (`$.traits`, `$.userId`, …). The schema is
//! declarative; cross-field invariants that cannot be expressed here are
//! checked imperatively inside the action's perform function.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Value type of a mapped field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Integer,
    Boolean,
    Object,
    DateTime,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Number => write!(f, "number"),
            Self::Integer => write!(f, "integer"),
            Self::Boolean => write!(f, "boolean"),
            Self::Object => write!(f, "object"),
            Self::DateTime => write!(f, "datetime"),
        }
    }
}

/// Default value for a field when the event mapping leaves it unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldDefault {
    /// A fixed literal value.
    Literal(Value),
    /// A JSONPath-style extraction rule into the incoming event,
    /// e.g. `$.traits` or `$.context.app.version`.
    EventPath(String),
}

/// One field in an action's static schema.
///
/// Serializable for catalog rendering; schemas are only ever constructed in
/// code, never parsed back.
#[derive(Debug, Clone, Serialize)]
pub struct InputField {
    /// Short human label shown in the mapping UI.
    pub label: &'static str,
    /// Human description of what the field carries.
    pub description: &'static str,
    /// Value type the mapping engine enforces.
    pub field_type: FieldType,
    /// Whether the mapping engine rejects events missing this field.
    pub required: bool,
    /// Default applied when the mapping leaves the field unset.
    pub default: Option<FieldDefault>,
}

impl InputField {
    /// An optional field with no default.
    pub const fn optional(
        label: &'static str,
        description: &'static str,
        field_type: FieldType,
    ) -> Self {
        Self {
            label,
            description,
            field_type,
            required: false,
            default: None,
        }
    }

    /// A required field with no default.
    pub const fn required(
        label: &'static str,
        description: &'static str,
        field_type: FieldType,
    ) -> Self {
        Self {
            label,
            description,
            field_type,
            required: true,
            default: None,
        }
    }

    /// Attach an event-path extraction default.
    pub fn with_event_path(mut self, path: impl Into<String>) -> Self {
        self.default = Some(FieldDefault::EventPath(path.into()));
        self
    }

    /// Attach a literal default.
    pub fn with_literal(mut self, value: Value) -> Self {
        self.default = Some(FieldDefault::Literal(value));
        self
    }
}
