//! Core field definition types.
//!
//! All types serialize to/from JSON via serde. A field definition describes
//! one named, typed prop of a directory record: which processing family it
//! belongs to (kind), which concrete processor handles it (type), and the
//! declarative constraints attached to it (validators).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use ulid::Ulid;

use crate::error::{FieldError, Result};

/// The processing family of a field. Kind selects structural normalization;
/// the `type` string selects the value-level processor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Plain scalar values: text, number, boolean, date, email, phone.
    Primitive,
    /// Structured values: selects, tags, experience entries, media.
    Composite,
    /// References to records in another directory.
    Relation,
    /// Values enriched from an external code table.
    Lookup,
    /// Server-derived values written through as-is.
    Computed,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Primitive => "primitive",
            FieldKind::Composite => "composite",
            FieldKind::Relation => "relation",
            FieldKind::Lookup => "lookup",
            FieldKind::Computed => "computed",
        }
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Unique identifier for a field definition (ULID).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
pub struct FieldDefId(Ulid);

impl FieldDefId {
    /// Generate a new unique field definition ID.
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    /// Parse a field definition ID from its string form.
    pub fn parse(s: &str) -> Result<Self> {
        Ulid::from_string(s)
            .map(Self)
            .map_err(|_| FieldError::invalid_id(s))
    }
}

impl Default for FieldDefId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for FieldDefId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Declarative constraints evaluated by the value processors.
///
/// All constraints are optional. Unknown JSON keys are ignored so older
/// definitions with extra constraint data still deserialize.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Validators {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_items: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,
}

impl Validators {
    pub fn is_empty(&self) -> bool {
        self == &Validators::default()
    }
}

/// A field definition — the complete schema for a single prop of a record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub id: FieldDefId,
    /// The directory this field belongs to.
    pub directory_id: String,
    /// The prop name this field governs inside a record.
    pub key: String,
    pub kind: FieldKind,
    /// Processor selector, e.g. "text", "number", "select", "image".
    #[serde(rename = "type")]
    pub field_type: String,
    /// Free-form per-type configuration (options, presets, media configs).
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub schema: Value,
    /// Relation target configuration for relation-kind fields.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub relation: Value,
    /// Code table configuration for lookup-kind fields.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub lookup: Value,
    /// Derivation configuration for computed-kind fields.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub computed: Value,
    #[serde(default, skip_serializing_if = "Validators::is_empty")]
    pub validators: Validators,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub read_roles: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub write_roles: Vec<String>,
    #[serde(default)]
    pub required: bool,
}

impl FieldDefinition {
    /// Create a field definition with a fresh ID and no constraints.
    pub fn new(
        directory_id: impl Into<String>,
        key: impl Into<String>,
        kind: FieldKind,
        field_type: impl Into<String>,
    ) -> Self {
        Self {
            id: FieldDefId::new(),
            directory_id: directory_id.into(),
            key: key.into(),
            kind,
            field_type: field_type.into(),
            schema: Value::Null,
            relation: Value::Null,
            lookup: Value::Null,
            computed: Value::Null,
            validators: Validators::default(),
            read_roles: Vec::new(),
            write_roles: Vec::new(),
            required: false,
        }
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_schema(mut self, schema: Value) -> Self {
        self.schema = schema;
        self
    }

    pub fn with_validators(mut self, validators: Validators) -> Self {
        self.validators = validators;
        self
    }

    pub fn with_relation(mut self, relation: Value) -> Self {
        self.relation = relation;
        self
    }

    pub fn with_lookup(mut self, lookup: Value) -> Self {
        self.lookup = lookup;
        self
    }

    pub fn with_read_roles(mut self, roles: Vec<String>) -> Self {
        self.read_roles = roles;
        self
    }

    pub fn with_write_roles(mut self, roles: Vec<String>) -> Self {
        self.write_roles = roles;
        self
    }

    /// Allowed values declared under `schema.options`. Entries may be plain
    /// strings or objects carrying a `value` key; anything else is skipped.
    pub fn options(&self) -> Vec<String> {
        let Some(entries) = self.schema.get("options").and_then(Value::as_array) else {
            return Vec::new();
        };
        entries
            .iter()
            .filter_map(|entry| match entry {
                Value::String(s) => Some(s.clone()),
                Value::Object(map) => map
                    .get("value")
                    .and_then(Value::as_str)
                    .map(|s| s.to_string()),
                _ => None,
            })
            .collect()
    }

    /// Whether the schema declares a preset source. Presets supply options
    /// dynamically, so membership cannot be checked against `options()`.
    pub fn has_preset(&self) -> bool {
        match self.schema.get("preset") {
            None | Some(Value::Null) => false,
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => !s.is_empty(),
            Some(_) => true,
        }
    }
}
