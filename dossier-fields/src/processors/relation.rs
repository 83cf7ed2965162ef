//! Processor for references to records in another directory.

use serde_json::Value;
use ulid::Ulid;

use super::{item_bounds_verdict, messages, presence_verdict, FieldProcessor, Verdict};
use crate::types::FieldDefinition;

/// Record references. `relation_one` holds a single target ID,
/// `relation_many` an array of them; both share this processor.
pub struct RelationProcessor {
    multiple: bool,
}

impl RelationProcessor {
    pub fn one() -> Self {
        Self { multiple: false }
    }

    pub fn many() -> Self {
        Self { multiple: true }
    }
}

fn valid_target_id(value: &Value) -> bool {
    value
        .as_str()
        .is_some_and(|s| Ulid::from_string(s.trim()).is_ok())
}

impl FieldProcessor for RelationProcessor {
    fn validate(&self, value: Option<&Value>, field: &FieldDefinition) -> Verdict {
        if let Some(verdict) = presence_verdict(value, field) {
            return verdict;
        }
        if self.multiple {
            let Some(items) = value.and_then(Value::as_array) else {
                return Verdict::fail(messages::NOT_AN_ARRAY);
            };
            for item in items {
                if !valid_target_id(item) {
                    return Verdict::fail(messages::INVALID_RELATION_ID);
                }
            }
            if let Some(verdict) = item_bounds_verdict(items.len(), field) {
                return verdict;
            }
            Verdict::Pass
        } else {
            match value {
                Some(v) if valid_target_id(v) => Verdict::Pass,
                _ => Verdict::fail(messages::INVALID_RELATION_ID),
            }
        }
    }

    fn transform(&self, value: Value, _field: &FieldDefinition) -> Value {
        match value {
            Value::String(s) => Value::String(s.trim().to_string()),
            Value::Array(items) => {
                let mut seen: Vec<String> = Vec::with_capacity(items.len());
                for item in items {
                    if let Value::String(s) = item {
                        let id = s.trim().to_string();
                        if !id.is_empty() && !seen.contains(&id) {
                            seen.push(id);
                        }
                    }
                }
                Value::Array(seen.into_iter().map(Value::String).collect())
            }
            other => other,
        }
    }

    fn format(&self, value: &Value, _field: &FieldDefinition) -> Value {
        value.clone()
    }
}
