//! Processors for uploaded media: image, video, file.
//!
//! A media value is either one item or an array of items depending on the
//! `multiple` flag in the field's media config. Each item is a bare URL
//! string or an object with `url`, and optionally `size` (bytes), `type`
//! (MIME) and `name` members filled in by the upload pipeline.

use serde_json::Value;

use super::{item_bounds_verdict, messages, presence_verdict, FieldProcessor, Verdict};
use crate::types::FieldDefinition;

pub struct MediaProcessor {
    config_key: &'static str,
    /// Generic files may live anywhere (object storage keys, share paths),
    /// so any non-empty string passes; images and videos need a real URL.
    any_location: bool,
}

impl MediaProcessor {
    pub fn image() -> Self {
        Self {
            config_key: "imageConfig",
            any_location: false,
        }
    }

    pub fn video() -> Self {
        Self {
            config_key: "videoConfig",
            any_location: false,
        }
    }

    pub fn file() -> Self {
        Self {
            config_key: "fileConfig",
            any_location: true,
        }
    }

    fn config(&self, field: &FieldDefinition) -> MediaConfig {
        let section = field.schema.get(self.config_key);
        MediaConfig {
            multiple: section
                .and_then(|s| s.get("multiple"))
                .and_then(Value::as_bool)
                .unwrap_or(false),
            max_size: section.and_then(|s| s.get("maxSize")).and_then(Value::as_u64),
            allowed_types: section
                .and_then(|s| s.get("allowedTypes"))
                .and_then(Value::as_array)
                .map(|types| {
                    types
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            any_location: self.any_location,
        }
    }
}

struct MediaConfig {
    multiple: bool,
    max_size: Option<u64>,
    allowed_types: Vec<String>,
    any_location: bool,
}

fn acceptable_url(url: &str, any_location: bool) -> bool {
    let url = url.trim();
    if any_location {
        return !url.is_empty();
    }
    url.starts_with("http://") || url.starts_with("https://") || url.starts_with("data:")
}

fn item_verdict(item: &Value, config: &MediaConfig) -> Verdict {
    match item {
        Value::String(url) if acceptable_url(url, config.any_location) => Verdict::Pass,
        Value::Object(members) => {
            match members.get("url").and_then(Value::as_str) {
                Some(url) if acceptable_url(url, config.any_location) => {}
                _ => return Verdict::fail(messages::INVALID_URL),
            }
            if let (Some(limit), Some(size)) =
                (config.max_size, members.get("size").and_then(Value::as_u64))
            {
                if size > limit {
                    return Verdict::fail(messages::FILE_TOO_LARGE);
                }
            }
            if !config.allowed_types.is_empty() {
                if let Some(mime) = members.get("type").and_then(Value::as_str) {
                    if !config.allowed_types.iter().any(|t| t == mime) {
                        return Verdict::fail(messages::FILE_TYPE_NOT_ALLOWED);
                    }
                }
            }
            Verdict::Pass
        }
        _ => Verdict::fail(messages::INVALID_URL),
    }
}

fn trim_item(item: Value) -> Value {
    match item {
        Value::String(url) => Value::String(url.trim().to_string()),
        Value::Object(mut members) => {
            if let Some(Value::String(url)) = members.get("url") {
                let trimmed = url.trim().to_string();
                members.insert("url".to_string(), Value::String(trimmed));
            }
            Value::Object(members)
        }
        other => other,
    }
}

impl FieldProcessor for MediaProcessor {
    fn validate(&self, value: Option<&Value>, field: &FieldDefinition) -> Verdict {
        if let Some(verdict) = presence_verdict(value, field) {
            return verdict;
        }
        let config = self.config(field);
        if config.multiple {
            let Some(items) = value.and_then(Value::as_array) else {
                return Verdict::fail(messages::NOT_AN_ARRAY);
            };
            for item in items {
                let verdict = item_verdict(item, &config);
                if !verdict.passed() {
                    return verdict;
                }
            }
            if let Some(verdict) = item_bounds_verdict(items.len(), field) {
                return verdict;
            }
            Verdict::Pass
        } else {
            match value {
                Some(item) => item_verdict(item, &config),
                None => Verdict::Pass,
            }
        }
    }

    fn transform(&self, value: Value, _field: &FieldDefinition) -> Value {
        match value {
            Value::Array(items) => Value::Array(items.into_iter().map(trim_item).collect()),
            other => trim_item(other),
        }
    }

    fn format(&self, value: &Value, _field: &FieldDefinition) -> Value {
        value.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FieldKind, Validators};
    use serde_json::json;

    fn image_field(config: Value) -> FieldDefinition {
        FieldDefinition::new("dir", "avatar", FieldKind::Composite, "image")
            .with_schema(json!({ "imageConfig": config }))
    }

    #[test]
    fn single_image_accepts_url_string_or_object() {
        let field = image_field(json!({}));
        assert!(MediaProcessor::image()
            .validate(Some(&json!("https://cdn.example.com/a.png")), &field)
            .passed());
        assert!(MediaProcessor::image()
            .validate(Some(&json!({ "url": "https://cdn.example.com/a.png" })), &field)
            .passed());
        let verdict =
            MediaProcessor::image().validate(Some(&json!("ftp://host/a.png")), &field);
        assert_eq!(verdict.message(), Some(messages::INVALID_URL));
        let verdict = MediaProcessor::image().validate(Some(&json!({})), &field);
        assert_eq!(verdict.message(), Some(messages::INVALID_URL));
    }

    #[test]
    fn size_limit_comes_from_media_config() {
        let field = image_field(json!({ "maxSize": 1024 }));
        let ok = json!({ "url": "https://cdn.example.com/a.png", "size": 1024 });
        assert!(MediaProcessor::image().validate(Some(&ok), &field).passed());
        let too_big = json!({ "url": "https://cdn.example.com/a.png", "size": 2048 });
        let verdict = MediaProcessor::image().validate(Some(&too_big), &field);
        assert_eq!(verdict.message(), Some(messages::FILE_TOO_LARGE));
    }

    #[test]
    fn mime_allow_list_comes_from_media_config() {
        let field = image_field(json!({ "allowedTypes": ["image/png", "image/jpeg"] }));
        let ok = json!({ "url": "https://cdn.example.com/a.png", "type": "image/png" });
        assert!(MediaProcessor::image().validate(Some(&ok), &field).passed());
        let bad = json!({ "url": "https://cdn.example.com/a.gif", "type": "image/gif" });
        let verdict = MediaProcessor::image().validate(Some(&bad), &field);
        assert_eq!(verdict.message(), Some(messages::FILE_TYPE_NOT_ALLOWED));
    }

    #[test]
    fn multiple_flag_switches_to_array_shape() {
        let field = image_field(json!({ "multiple": true }));
        let items = json!(["https://a.example.com/1.png", "https://a.example.com/2.png"]);
        assert!(MediaProcessor::image().validate(Some(&items), &field).passed());
        let verdict = MediaProcessor::image()
            .validate(Some(&json!("https://a.example.com/1.png")), &field);
        assert_eq!(verdict.message(), Some(messages::NOT_AN_ARRAY));
    }

    #[test]
    fn multiple_respects_item_bounds() {
        let field = FieldDefinition::new("dir", "gallery", FieldKind::Composite, "image")
            .with_schema(json!({ "imageConfig": { "multiple": true } }))
            .with_validators(Validators {
                max_items: Some(1),
                ..Default::default()
            });
        let items = json!(["https://a.example.com/1.png", "https://a.example.com/2.png"]);
        let verdict = MediaProcessor::image().validate(Some(&items), &field);
        assert_eq!(verdict.message(), Some("最多选择1项"));
    }

    #[test]
    fn file_type_accepts_any_non_empty_location() {
        let field = FieldDefinition::new("dir", "attachment", FieldKind::Composite, "file");
        assert!(MediaProcessor::file()
            .validate(Some(&json!("oss://bucket/report.pdf")), &field)
            .passed());
        assert!(MediaProcessor::file()
            .validate(Some(&json!({ "url": "bucket/report.pdf" })), &field)
            .passed());
        // Images still require an absolute URL or data URI.
        let verdict = MediaProcessor::image()
            .validate(Some(&json!("oss://bucket/photo.png")), &field);
        assert_eq!(verdict.message(), Some(messages::INVALID_URL));
    }

    #[test]
    fn transform_trims_urls_in_both_shapes() {
        let field = image_field(json!({}));
        assert_eq!(
            MediaProcessor::image().transform(json!(" https://a.example.com/1.png "), &field),
            json!("https://a.example.com/1.png")
        );
        assert_eq!(
            MediaProcessor::image()
                .transform(json!({ "url": " https://a.example.com/1.png " }), &field),
            json!({ "url": "https://a.example.com/1.png" })
        );
    }
}
