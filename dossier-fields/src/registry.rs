//! Type-keyed processor registry and record-level processing.
//!
//! The registry maps a field's `type` string to its value processor and
//! lifts the per-field operations to whole records. Unknown types are not
//! an error: they fall back to the text processor so a directory keeps
//! working after a processor is renamed or retired.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::processors::choice::{MultiSelectProcessor, SelectProcessor, TagsProcessor};
use crate::processors::contact::{EmailProcessor, PhoneProcessor};
use crate::processors::datetime::DateProcessor;
use crate::processors::experience::ExperienceProcessor;
use crate::processors::media::MediaProcessor;
use crate::processors::relation::RelationProcessor;
use crate::processors::scalar::{BooleanProcessor, NumberProcessor, TextProcessor};
use crate::processors::{FieldProcessor, Verdict};
use crate::types::FieldDefinition;

/// Aggregated validation outcome for one record. Failures are keyed by
/// field key; every failing field is reported, not just the first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    errors: BTreeMap<String, String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    pub fn into_errors(self) -> BTreeMap<String, String> {
        self.errors
    }

    fn record_failure(&mut self, key: &str, message: String) {
        self.errors.insert(key.to_string(), message);
    }
}

/// Registry of value processors keyed by field type.
pub struct ProcessorRegistry {
    processors: HashMap<String, Arc<dyn FieldProcessor>>,
    fallback: Arc<dyn FieldProcessor>,
}

impl ProcessorRegistry {
    /// Build a registry with every built-in field type registered.
    pub fn new() -> Self {
        let mut registry = Self {
            processors: HashMap::new(),
            fallback: Arc::new(TextProcessor),
        };
        registry.register("text", Arc::new(TextProcessor));
        registry.register("number", Arc::new(NumberProcessor));
        registry.register("boolean", Arc::new(BooleanProcessor));
        registry.register("date", Arc::new(DateProcessor));
        registry.register("email", Arc::new(EmailProcessor));
        registry.register("phone", Arc::new(PhoneProcessor));
        registry.register("select", Arc::new(SelectProcessor));
        registry.register("multiselect", Arc::new(MultiSelectProcessor));
        registry.register("tags", Arc::new(TagsProcessor));
        registry.register("relation_one", Arc::new(RelationProcessor::one()));
        registry.register("relation_many", Arc::new(RelationProcessor::many()));
        registry.register("experience", Arc::new(ExperienceProcessor));
        registry.register("image", Arc::new(MediaProcessor::image()));
        registry.register("video", Arc::new(MediaProcessor::video()));
        registry.register("file", Arc::new(MediaProcessor::file()));
        registry
    }

    /// Register or replace the processor for a field type.
    pub fn register(&mut self, field_type: impl Into<String>, processor: Arc<dyn FieldProcessor>) {
        self.processors.insert(field_type.into(), processor);
    }

    /// Look up the processor for a type, falling back to text.
    pub fn processor_for(&self, field_type: &str) -> &Arc<dyn FieldProcessor> {
        match self.processors.get(field_type) {
            Some(processor) => processor,
            None => {
                tracing::debug!(field_type, "no processor for type, using text fallback");
                &self.fallback
            }
        }
    }

    pub fn validate_field(&self, value: Option<&Value>, field: &FieldDefinition) -> Verdict {
        self.processor_for(&field.field_type).validate(value, field)
    }

    pub fn transform_field(&self, value: Value, field: &FieldDefinition) -> Value {
        self.processor_for(&field.field_type).transform(value, field)
    }

    pub fn format_field(&self, value: &Value, field: &FieldDefinition) -> Value {
        self.processor_for(&field.field_type).format(value, field)
    }

    /// Validate every declared field of a record in one pass.
    pub fn validate_record(
        &self,
        props: &Map<String, Value>,
        fields: &[FieldDefinition],
    ) -> ValidationReport {
        let mut report = ValidationReport::default();
        for field in fields {
            let verdict = self.validate_field(props.get(&field.key), field);
            if let Some(message) = verdict.message() {
                report.record_failure(&field.key, message.to_string());
            }
        }
        report
    }

    /// Canonicalize a record's props for storage. Only declared props
    /// survive; anything else the client sent is dropped.
    pub fn transform_record(
        &self,
        props: &Map<String, Value>,
        fields: &[FieldDefinition],
    ) -> Map<String, Value> {
        let mut out = Map::new();
        for field in fields {
            if let Some(value) = props.get(&field.key) {
                out.insert(
                    field.key.clone(),
                    self.transform_field(value.clone(), field),
                );
            }
        }
        out
    }

    /// Render stored props for display. Declared props go through their
    /// processor; props whose definition has since been removed pass
    /// through unchanged.
    pub fn format_record(
        &self,
        props: &Map<String, Value>,
        fields: &[FieldDefinition],
    ) -> Map<String, Value> {
        let by_key: HashMap<&str, &FieldDefinition> =
            fields.iter().map(|f| (f.key.as_str(), f)).collect();
        let mut out = Map::new();
        for (key, value) in props {
            let formatted = match by_key.get(key.as_str()) {
                Some(field) => self.format_field(value, field),
                None => value.clone(),
            };
            out.insert(key.clone(), formatted);
        }
        out
    }
}

impl Default for ProcessorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
