//! Processors for contact details: email addresses and mobile numbers.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use super::{messages, presence_verdict, FieldProcessor, Verdict};
use crate::types::FieldDefinition;

static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_email_regex() -> &'static Regex {
    EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("Invalid email regex")
    })
}

static PHONE_REGEX: OnceLock<Regex> = OnceLock::new();

/// Mainland China mobile numbers: 11 digits, leading 1, second digit 3-9.
fn get_phone_regex() -> &'static Regex {
    PHONE_REGEX.get_or_init(|| Regex::new(r"^1[3-9]\d{9}$").expect("Invalid phone regex"))
}

pub struct EmailProcessor;

impl FieldProcessor for EmailProcessor {
    fn validate(&self, value: Option<&Value>, field: &FieldDefinition) -> Verdict {
        if let Some(verdict) = presence_verdict(value, field) {
            return verdict;
        }
        match value.and_then(Value::as_str) {
            Some(text) if get_email_regex().is_match(text.trim()) => Verdict::Pass,
            _ => Verdict::fail(messages::INVALID_EMAIL),
        }
    }

    fn transform(&self, value: Value, _field: &FieldDefinition) -> Value {
        match value {
            Value::String(s) => Value::String(s.trim().to_lowercase()),
            other => other,
        }
    }

    fn format(&self, value: &Value, _field: &FieldDefinition) -> Value {
        value.clone()
    }
}

pub struct PhoneProcessor;

impl FieldProcessor for PhoneProcessor {
    fn validate(&self, value: Option<&Value>, field: &FieldDefinition) -> Verdict {
        if let Some(verdict) = presence_verdict(value, field) {
            return verdict;
        }
        match value.and_then(Value::as_str) {
            Some(text) if get_phone_regex().is_match(&strip_separators(text)) => Verdict::Pass,
            _ => Verdict::fail(messages::INVALID_PHONE),
        }
    }

    fn transform(&self, value: Value, _field: &FieldDefinition) -> Value {
        match value {
            Value::String(s) => Value::String(strip_separators(&s)),
            other => other,
        }
    }

    fn format(&self, value: &Value, _field: &FieldDefinition) -> Value {
        value.clone()
    }
}

/// Drop the spacing and dashes people paste along with a number.
fn strip_separators(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldKind;
    use serde_json::json;

    fn email_field() -> FieldDefinition {
        FieldDefinition::new("dir", "email", FieldKind::Primitive, "email")
    }

    fn phone_field() -> FieldDefinition {
        FieldDefinition::new("dir", "mobile", FieldKind::Primitive, "phone")
    }

    #[test]
    fn email_validation() {
        let field = email_field();
        assert!(EmailProcessor
            .validate(Some(&json!("user@example.com")), &field)
            .passed());
        for bad in ["user", "user@", "@example.com", "user example.com", "a@b"] {
            let verdict = EmailProcessor.validate(Some(&json!(bad)), &field);
            assert_eq!(verdict.message(), Some(messages::INVALID_EMAIL), "{bad}");
        }
    }

    #[test]
    fn email_transform_lowercases() {
        let field = email_field();
        assert_eq!(
            EmailProcessor.transform(json!("  User@Example.COM "), &field),
            json!("user@example.com")
        );
    }

    #[test]
    fn phone_validation() {
        let field = phone_field();
        assert!(PhoneProcessor.validate(Some(&json!("13812345678")), &field).passed());
        assert!(PhoneProcessor
            .validate(Some(&json!("138 1234 5678")), &field)
            .passed());
        for bad in ["12812345678", "1381234567", "138123456789", "phone"] {
            let verdict = PhoneProcessor.validate(Some(&json!(bad)), &field);
            assert_eq!(verdict.message(), Some(messages::INVALID_PHONE), "{bad}");
        }
    }

    #[test]
    fn phone_transform_strips_separators() {
        let field = phone_field();
        assert_eq!(
            PhoneProcessor.transform(json!("138-1234-5678"), &field),
            json!("13812345678")
        );
        // Applying it again changes nothing.
        assert_eq!(
            PhoneProcessor.transform(json!("13812345678"), &field),
            json!("13812345678")
        );
    }
}
