//! Date processor.

use chrono::{DateTime, NaiveDate};
use serde_json::Value;

use super::{messages, presence_verdict, FieldProcessor, Verdict};
use crate::types::FieldDefinition;

/// Calendar dates. Accepts RFC 3339 timestamps or plain `YYYY-MM-DD`
/// strings; impossible dates like `2023-02-30` are rejected by parsing.
/// Format renders the `YYYY-MM-DD` day.
pub struct DateProcessor;

/// Parse a date string to its calendar day. A timestamp keeps the day of
/// its own offset rather than being shifted to UTC first.
pub(crate) fn parse_date(text: &str) -> Option<NaiveDate> {
    if let Ok(stamp) = DateTime::parse_from_rfc3339(text) {
        return Some(stamp.date_naive());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
}

impl FieldProcessor for DateProcessor {
    fn validate(&self, value: Option<&Value>, field: &FieldDefinition) -> Verdict {
        if let Some(verdict) = presence_verdict(value, field) {
            return verdict;
        }
        match value.and_then(Value::as_str) {
            Some(text) if parse_date(text.trim()).is_some() => Verdict::Pass,
            _ => Verdict::fail(messages::INVALID_DATE),
        }
    }

    fn transform(&self, value: Value, _field: &FieldDefinition) -> Value {
        match value {
            Value::String(s) => Value::String(s.trim().to_string()),
            other => other,
        }
    }

    fn format(&self, value: &Value, _field: &FieldDefinition) -> Value {
        match value.as_str().and_then(|s| parse_date(s.trim())) {
            Some(day) => Value::String(day.format("%Y-%m-%d").to_string()),
            None => value.clone(),
        }
    }
}
