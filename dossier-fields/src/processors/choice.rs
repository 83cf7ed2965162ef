//! Processors for enumerated values: select, multiselect, tags.

use serde_json::Value;

use super::{item_bounds_verdict, messages, presence_verdict, FieldProcessor, Verdict};
use crate::types::FieldDefinition;

/// Membership is only enforceable when the definition declares a static
/// option list. Preset-backed fields resolve their options elsewhere, so
/// any value is accepted here.
fn membership_enforced(field: &FieldDefinition) -> bool {
    !field.has_preset() && !field.options().is_empty()
}

fn option_label(field: &FieldDefinition, value: &str) -> Option<String> {
    let entries = field.schema.get("options").and_then(Value::as_array)?;
    for entry in entries {
        let Some(map) = entry.as_object() else { continue };
        if map.get("value").and_then(Value::as_str) == Some(value) {
            return map.get("label").and_then(Value::as_str).map(str::to_string);
        }
    }
    None
}

/// Single choice out of a declared option list.
pub struct SelectProcessor;

impl FieldProcessor for SelectProcessor {
    fn validate(&self, value: Option<&Value>, field: &FieldDefinition) -> Verdict {
        if let Some(verdict) = presence_verdict(value, field) {
            return verdict;
        }
        let Some(choice) = value.and_then(Value::as_str) else {
            return Verdict::fail(messages::NOT_TEXT);
        };
        if membership_enforced(field) && !field.options().contains(&choice.trim().to_string()) {
            return Verdict::fail(messages::OPTION_NOT_ALLOWED);
        }
        Verdict::Pass
    }

    fn transform(&self, value: Value, _field: &FieldDefinition) -> Value {
        match value {
            Value::String(s) => Value::String(s.trim().to_string()),
            other => other,
        }
    }

    fn format(&self, value: &Value, field: &FieldDefinition) -> Value {
        match value.as_str().and_then(|v| option_label(field, v)) {
            Some(label) => Value::String(label),
            None => value.clone(),
        }
    }
}

/// Multiple choices out of a declared option list.
pub struct MultiSelectProcessor;

impl FieldProcessor for MultiSelectProcessor {
    fn validate(&self, value: Option<&Value>, field: &FieldDefinition) -> Verdict {
        if let Some(verdict) = presence_verdict(value, field) {
            return verdict;
        }
        let Some(items) = value.and_then(Value::as_array) else {
            return Verdict::fail(messages::NOT_AN_ARRAY);
        };
        let enforce = membership_enforced(field);
        let options = field.options();
        for item in items {
            let Some(choice) = item.as_str() else {
                return Verdict::fail(messages::OPTION_NOT_ALLOWED);
            };
            let choice = choice.trim();
            if choice.is_empty() {
                return Verdict::fail(messages::EMPTY_OPTION);
            }
            if enforce && !options.contains(&choice.to_string()) {
                return Verdict::fail(messages::OPTION_NOT_ALLOWED);
            }
        }
        if let Some(verdict) = item_bounds_verdict(items.len(), field) {
            return verdict;
        }
        Verdict::Pass
    }

    fn transform(&self, value: Value, _field: &FieldDefinition) -> Value {
        match value {
            Value::Array(items) => Value::Array(
                items
                    .into_iter()
                    .map(|item| match item {
                        Value::String(s) => Value::String(s.trim().to_string()),
                        other => other,
                    })
                    .collect(),
            ),
            other => other,
        }
    }

    fn format(&self, value: &Value, field: &FieldDefinition) -> Value {
        match value.as_array() {
            Some(items) => Value::Array(
                items
                    .iter()
                    .map(|item| SelectProcessor.format(item, field))
                    .collect(),
            ),
            None => value.clone(),
        }
    }
}

/// Free-form string labels. No option list; elements just have to be
/// non-empty strings. Count bounds apply to the distinct trimmed
/// elements, the same set transform stores, so a stored value always
/// re-validates.
pub struct TagsProcessor;

impl FieldProcessor for TagsProcessor {
    fn validate(&self, value: Option<&Value>, field: &FieldDefinition) -> Verdict {
        if let Some(verdict) = presence_verdict(value, field) {
            return verdict;
        }
        let Some(items) = value.and_then(Value::as_array) else {
            return Verdict::fail(messages::NOT_AN_ARRAY);
        };
        let mut distinct: Vec<&str> = Vec::with_capacity(items.len());
        for item in items {
            match item.as_str().map(str::trim) {
                Some(tag) if !tag.is_empty() => {
                    if !distinct.contains(&tag) {
                        distinct.push(tag);
                    }
                }
                _ => return Verdict::fail(messages::EMPTY_TAG),
            }
        }
        if let Some(verdict) = item_bounds_verdict(distinct.len(), field) {
            return verdict;
        }
        Verdict::Pass
    }

    fn transform(&self, value: Value, _field: &FieldDefinition) -> Value {
        let Value::Array(items) = value else {
            return value;
        };
        let mut seen: Vec<String> = Vec::with_capacity(items.len());
        for item in items {
            if let Value::String(s) = item {
                let tag = s.trim().to_string();
                if !tag.is_empty() && !seen.contains(&tag) {
                    seen.push(tag);
                }
            }
        }
        Value::Array(seen.into_iter().map(Value::String).collect())
    }

    fn format(&self, value: &Value, _field: &FieldDefinition) -> Value {
        value.clone()
    }
}
