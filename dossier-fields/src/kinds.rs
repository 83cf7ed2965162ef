//! Kind-keyed structural normalizers.
//!
//! Kinds cut across field types: where the type registry handles values,
//! the kind registry reshapes structure at the write edge. Relation values
//! fan out to arrays, lookup codes are enriched into code tables entries,
//! computed values pass through for the server-side deriver. Unlike an
//! unknown type, an unknown kind means the directory configuration and
//! the engine disagree, and the write is aborted.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::error::{FieldError, Result};
use crate::types::{FieldDefinition, FieldKind};

/// Structural normalizer for one field kind. Returns `None` to drop the
/// prop from the record entirely.
pub trait KindNormalizer: Send + Sync {
    fn normalize(&self, value: Value, field: &FieldDefinition) -> Option<Value>;
}

/// Identity normalization for kinds with no structural rules.
pub struct PassthroughNormalizer;

impl KindNormalizer for PassthroughNormalizer {
    fn normalize(&self, value: Value, _field: &FieldDefinition) -> Option<Value> {
        Some(value)
    }
}

/// Fans a bare target ID out to a single-element array on many-valued
/// relation fields, so clients can submit either shape.
pub struct RelationNormalizer;

fn is_many_relation(field: &FieldDefinition) -> bool {
    field.field_type == "relation_many"
        || field
            .relation
            .get("multiple")
            .and_then(Value::as_bool)
            .unwrap_or(false)
}

impl KindNormalizer for RelationNormalizer {
    fn normalize(&self, value: Value, field: &FieldDefinition) -> Option<Value> {
        if is_many_relation(field) {
            if let Value::String(id) = value {
                return Some(json!([id]));
            }
        }
        Some(value)
    }
}

/// Expands a bare lookup code into its stored entry shape. A full entry
/// object passes through with its source filled in.
pub struct LookupNormalizer;

fn lookup_source(field: &FieldDefinition) -> String {
    field
        .lookup
        .get("source")
        .and_then(Value::as_str)
        .unwrap_or("default")
        .to_string()
}

impl KindNormalizer for LookupNormalizer {
    fn normalize(&self, value: Value, field: &FieldDefinition) -> Option<Value> {
        match value {
            Value::String(code) => Some(json!({
                "code": code,
                "name": code,
                "source": lookup_source(field),
            })),
            Value::Object(mut entry) => {
                if entry.contains_key("code") {
                    if !entry.contains_key("name") {
                        if let Some(code) = entry.get("code").cloned() {
                            entry.insert("name".to_string(), code);
                        }
                    }
                    entry
                        .entry("source".to_string())
                        .or_insert_with(|| Value::String(lookup_source(field)));
                }
                Some(Value::Object(entry))
            }
            other => Some(other),
        }
    }
}

/// Computed values are produced server-side by the deriver and written
/// through untouched here.
pub struct ComputedNormalizer;

impl KindNormalizer for ComputedNormalizer {
    fn normalize(&self, value: Value, _field: &FieldDefinition) -> Option<Value> {
        Some(value)
    }
}

/// Registry of structural normalizers keyed by field kind.
pub struct KindRegistry {
    normalizers: HashMap<FieldKind, Arc<dyn KindNormalizer>>,
}

impl KindRegistry {
    /// Build a registry with every built-in kind registered.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(FieldKind::Primitive, Arc::new(PassthroughNormalizer));
        registry.register(FieldKind::Composite, Arc::new(PassthroughNormalizer));
        registry.register(FieldKind::Relation, Arc::new(RelationNormalizer));
        registry.register(FieldKind::Lookup, Arc::new(LookupNormalizer));
        registry.register(FieldKind::Computed, Arc::new(ComputedNormalizer));
        registry
    }

    /// A registry with nothing registered, for selective builds.
    pub fn empty() -> Self {
        Self {
            normalizers: HashMap::new(),
        }
    }

    /// Register or replace the normalizer for a kind.
    pub fn register(&mut self, kind: FieldKind, normalizer: Arc<dyn KindNormalizer>) {
        self.normalizers.insert(kind, normalizer);
    }

    /// Look up the normalizer for a kind. Missing kinds are a
    /// configuration fault, not a validation failure.
    pub fn normalizer_for(&self, kind: FieldKind) -> Result<&Arc<dyn KindNormalizer>> {
        self.normalizers
            .get(&kind)
            .ok_or_else(|| FieldError::unknown_kind(kind.as_str()))
    }

    /// Apply structural normalization to every declared prop of a record.
    /// Undeclared props are left for the transform pass to drop.
    pub fn normalize_record(
        &self,
        mut props: Map<String, Value>,
        fields: &[FieldDefinition],
    ) -> Result<Map<String, Value>> {
        for field in fields {
            let Some(value) = props.remove(&field.key) else {
                continue;
            };
            let normalizer = self.normalizer_for(field.kind)?;
            if let Some(normalized) = normalizer.normalize(value, field) {
                props.insert(field.key.clone(), normalized);
            }
        }
        Ok(props)
    }
}

impl Default for KindRegistry {
    fn default() -> Self {
        Self::new()
    }
}
