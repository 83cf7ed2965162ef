//! Processors for plain scalar types: text, number, boolean.

use serde_json::Value;

use super::{messages, presence_verdict, FieldProcessor, Verdict};
use crate::types::FieldDefinition;

/// Tolerance for step alignment checks on floating point values.
const STEP_EPSILON: f64 = 1e-9;

/// Free-form text. Also the fallback processor for unknown field types, so
/// it must tolerate any declared configuration.
pub struct TextProcessor;

impl FieldProcessor for TextProcessor {
    fn validate(&self, value: Option<&Value>, field: &FieldDefinition) -> Verdict {
        if let Some(verdict) = presence_verdict(value, field) {
            return verdict;
        }
        let Some(text) = value.and_then(Value::as_str) else {
            return Verdict::fail(messages::NOT_TEXT);
        };
        let trimmed = text.trim();
        // Character count, not byte length: CJK text is the common case.
        let len = trimmed.chars().count();
        if let Some(min) = field.validators.min_length {
            if len < min {
                return Verdict::fail(messages::text_min_length(min));
            }
        }
        if let Some(max) = field.validators.max_length {
            if len > max {
                return Verdict::fail(messages::text_max_length(max));
            }
        }
        if let Some(pattern) = &field.validators.pattern {
            match regex::Regex::new(pattern) {
                Ok(re) => {
                    if !re.is_match(trimmed) {
                        return Verdict::fail(messages::PATTERN_MISMATCH);
                    }
                }
                Err(_) => {
                    tracing::warn!(
                        field = %field.key,
                        pattern = %pattern,
                        "unparseable validation pattern, constraint skipped"
                    );
                }
            }
        }
        Verdict::Pass
    }

    fn transform(&self, value: Value, _field: &FieldDefinition) -> Value {
        match value {
            Value::String(s) => Value::String(s.trim().to_string()),
            other => other,
        }
    }

    fn format(&self, value: &Value, _field: &FieldDefinition) -> Value {
        value.clone()
    }
}

/// Numbers. Validation accepts numeric strings because transform coerces
/// them, so a client sending `"30"` gets the same outcome as `30`.
pub struct NumberProcessor;

fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn off_step(value: f64, step: f64, base: f64) -> bool {
    if step <= 0.0 {
        return false;
    }
    let rem = ((value - base) % step).abs();
    rem > STEP_EPSILON && (step - rem).abs() > STEP_EPSILON
}

impl FieldProcessor for NumberProcessor {
    fn validate(&self, value: Option<&Value>, field: &FieldDefinition) -> Verdict {
        if let Some(verdict) = presence_verdict(value, field) {
            return verdict;
        }
        let Some(number) = value.and_then(numeric_value) else {
            return Verdict::fail(messages::NOT_A_NUMBER);
        };
        let validators = &field.validators;
        if let Some(min) = validators.min {
            if number < min {
                return Verdict::fail(messages::number_min(min));
            }
        }
        if let Some(max) = validators.max {
            if number > max {
                return Verdict::fail(messages::number_max(max));
            }
        }
        if let Some(step) = validators.step {
            let base = validators.min.unwrap_or(0.0);
            if off_step(number, step, base) {
                return Verdict::fail(messages::number_step(step));
            }
        }
        Verdict::Pass
    }

    fn transform(&self, value: Value, _field: &FieldDefinition) -> Value {
        match &value {
            // Already a number: keep the exact representation.
            Value::Number(_) => value,
            Value::String(s) => match s.trim().parse::<f64>().ok().filter(|f| f.is_finite()) {
                Some(parsed) => {
                    if parsed.fract() == 0.0
                        && parsed >= i64::MIN as f64
                        && parsed <= i64::MAX as f64
                    {
                        Value::from(parsed as i64)
                    } else {
                        serde_json::Number::from_f64(parsed)
                            .map(Value::Number)
                            .unwrap_or(value)
                    }
                }
                None => value,
            },
            _ => value,
        }
    }

    fn format(&self, value: &Value, _field: &FieldDefinition) -> Value {
        value.clone()
    }
}

/// Booleans, with coercion for the string and 0/1 forms clients send.
pub struct BooleanProcessor;

fn boolean_value(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        Value::Number(n) => match n.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        _ => None,
    }
}

impl FieldProcessor for BooleanProcessor {
    fn validate(&self, value: Option<&Value>, field: &FieldDefinition) -> Verdict {
        if let Some(verdict) = presence_verdict(value, field) {
            return verdict;
        }
        match value.and_then(boolean_value) {
            Some(_) => Verdict::Pass,
            None => Verdict::fail(messages::NOT_A_BOOLEAN),
        }
    }

    fn transform(&self, value: Value, _field: &FieldDefinition) -> Value {
        match boolean_value(&value) {
            Some(b) => Value::Bool(b),
            None => value,
        }
    }

    fn format(&self, value: &Value, _field: &FieldDefinition) -> Value {
        value.clone()
    }
}
