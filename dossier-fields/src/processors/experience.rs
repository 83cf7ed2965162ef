//! Processor for experience histories: work, education, projects.
//!
//! An experience value is an array of entry objects. Entries are
//! client-assembled and arrive sparse, so transform strips the null and
//! blank members instead of storing them.

use serde_json::{Map, Value};

use super::datetime::parse_date;
use super::{messages, presence_verdict, FieldProcessor, Verdict};
use crate::types::FieldDefinition;

/// Entry keys holding a date string when present.
const DATE_KEYS: [&str; 2] = ["startDate", "endDate"];
/// Entry keys holding free text when present.
const TEXT_KEYS: [&str; 2] = ["title", "organization"];
/// Entry keys holding a string array when present.
const LIST_KEYS: [&str; 2] = ["skills", "achievements"];

pub struct ExperienceProcessor;

fn entry_string(entry: &Map<String, Value>, key: &str) -> Option<String> {
    entry
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Validate one entry. `id` and `type` are mandatory; every other member
/// is optional but must carry the right shape when present. A `null`
/// member counts as absent (sparse form, stripped by transform).
fn entry_verdict(entry: &Value) -> Verdict {
    let Some(fields) = entry.as_object() else {
        return Verdict::fail(messages::INVALID_EXPERIENCE_ENTRY);
    };
    if entry_string(fields, "id").is_none() || entry_string(fields, "type").is_none() {
        return Verdict::fail(messages::EXPERIENCE_ENTRY_MISSING_FIELDS);
    }
    for key in TEXT_KEYS {
        if matches!(fields.get(key), Some(v) if !v.is_null() && !v.is_string()) {
            return Verdict::fail(messages::INVALID_EXPERIENCE_ENTRY);
        }
    }
    for key in DATE_KEYS {
        match fields.get(key) {
            None | Some(Value::Null) => {}
            Some(Value::String(raw)) => {
                let date = raw.trim();
                if !date.is_empty() && parse_date(date).is_none() {
                    return Verdict::fail(messages::INVALID_DATE);
                }
            }
            Some(_) => return Verdict::fail(messages::INVALID_DATE),
        }
    }
    for key in LIST_KEYS {
        match fields.get(key) {
            None | Some(Value::Null) => {}
            Some(Value::Array(items)) => {
                if items.iter().any(|item| !item.is_string()) {
                    return Verdict::fail(messages::INVALID_EXPERIENCE_ENTRY);
                }
            }
            Some(_) => return Verdict::fail(messages::INVALID_EXPERIENCE_ENTRY),
        }
    }
    Verdict::Pass
}

impl FieldProcessor for ExperienceProcessor {
    fn validate(&self, value: Option<&Value>, field: &FieldDefinition) -> Verdict {
        if let Some(verdict) = presence_verdict(value, field) {
            return verdict;
        }
        let Some(entries) = value.and_then(Value::as_array) else {
            return Verdict::fail(messages::NOT_AN_ARRAY);
        };
        for entry in entries {
            let verdict = entry_verdict(entry);
            if !verdict.passed() {
                return verdict;
            }
        }
        Verdict::Pass
    }

    fn transform(&self, value: Value, _field: &FieldDefinition) -> Value {
        let Value::Array(entries) = value else {
            return value;
        };
        Value::Array(entries.into_iter().map(strip_sparse_members).collect())
    }

    fn format(&self, value: &Value, _field: &FieldDefinition) -> Value {
        value.clone()
    }
}

/// Drop null and blank-string members from an entry. Entry order and
/// non-object entries are preserved.
fn strip_sparse_members(entry: Value) -> Value {
    let Value::Object(fields) = entry else {
        return entry;
    };
    let kept: Map<String, Value> = fields
        .into_iter()
        .filter(|(_, v)| match v {
            Value::Null => false,
            Value::String(s) => !s.trim().is_empty(),
            _ => true,
        })
        .collect();
    Value::Object(kept)
}
