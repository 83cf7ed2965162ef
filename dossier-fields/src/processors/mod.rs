//! Value-level field processors.
//!
//! Every field type has a processor with three operations:
//!
//! - `validate` checks a submitted prop against the field definition and
//!   reports a human-readable failure message
//! - `transform` canonicalizes a value before storage (trimming, coercion,
//!   deduplication); it must be idempotent
//! - `format` renders a stored value for display
//!
//! Processors never abort a whole record: each verdict stands alone so the
//! caller can aggregate failures across all fields in one pass.

pub mod choice;
pub mod contact;
pub mod datetime;
pub mod experience;
pub mod media;
pub mod messages;
pub mod relation;
pub mod scalar;

use serde_json::Value;

use crate::types::FieldDefinition;

/// Outcome of validating a single prop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail(String),
}

impl Verdict {
    /// Create a failing verdict with the given message.
    pub fn fail(message: impl Into<String>) -> Self {
        Self::Fail(message.into())
    }

    pub fn passed(&self) -> bool {
        matches!(self, Verdict::Pass)
    }

    /// The failure message, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            Verdict::Pass => None,
            Verdict::Fail(msg) => Some(msg),
        }
    }
}

/// A value-level processor for one field type.
///
/// `validate` receives `None` when the prop is absent from the record, so
/// required checks and presence checks live in one place. `transform` and
/// `format` are only invoked on present values.
pub trait FieldProcessor: Send + Sync {
    fn validate(&self, value: Option<&Value>, field: &FieldDefinition) -> Verdict;

    fn transform(&self, value: Value, field: &FieldDefinition) -> Value;

    fn format(&self, value: &Value, field: &FieldDefinition) -> Value;
}

/// Whether a submitted value counts as "not provided": absent, null, a
/// blank string, or an empty array.
pub(crate) fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}

/// Shared prologue for validators: blank values pass unless the field is
/// required. Returns `None` when the value is present and type-specific
/// checks should continue.
pub(crate) fn presence_verdict(value: Option<&Value>, field: &FieldDefinition) -> Option<Verdict> {
    if is_blank(value) {
        if field.required {
            Some(Verdict::fail(messages::REQUIRED))
        } else {
            Some(Verdict::Pass)
        }
    } else {
        None
    }
}

/// Check an element count against the minItems/maxItems validators.
pub(crate) fn item_bounds_verdict(count: usize, field: &FieldDefinition) -> Option<Verdict> {
    if let Some(min) = field.validators.min_items {
        if count < min {
            return Some(Verdict::fail(messages::min_items(min)));
        }
    }
    if let Some(max) = field.validators.max_items {
        if count > max {
            return Some(Verdict::fail(messages::max_items(max)));
        }
    }
    None
}
