//! Schema-driven field processing engine
//!
//! This crate implements the field layer of the dossier record engine. A
//! directory's record shape is not compiled in: it is declared at runtime
//! as a list of [`FieldDefinition`]s, and every declared field is handled
//! by a processor chosen from two registries.
//!
//! - The [`ProcessorRegistry`] maps a field's `type` string ("text",
//!   "number", "select", "image", ...) to a value-level
//!   [`FieldProcessor`] with three operations: validate, transform and
//!   format. Unknown types fall back to the text processor.
//! - The [`KindRegistry`] maps a field's [`FieldKind`] (primitive,
//!   composite, relation, lookup, computed) to a structural
//!   [`KindNormalizer`] applied at the write edge. An unknown kind is a
//!   configuration fault and aborts the write.
//!
//! ## Basic Usage
//!
//! ```rust
//! use dossier_fields::{FieldDefinition, FieldKind, ProcessorRegistry, Validators};
//! use serde_json::json;
//!
//! let fields = vec![
//!     FieldDefinition::new("dir_users", "name", FieldKind::Primitive, "text")
//!         .with_required(true),
//!     FieldDefinition::new("dir_users", "age", FieldKind::Primitive, "number")
//!         .with_validators(Validators {
//!             min: Some(0.0),
//!             max: Some(150.0),
//!             ..Default::default()
//!         }),
//! ];
//!
//! let registry = ProcessorRegistry::new();
//! let props = json!({ "name": "  张三  ", "age": "30" });
//! let report = registry.validate_record(props.as_object().unwrap(), &fields);
//! assert!(report.is_valid());
//!
//! let stored = registry.transform_record(props.as_object().unwrap(), &fields);
//! assert_eq!(stored.get("name"), Some(&json!("张三")));
//! assert_eq!(stored.get("age"), Some(&json!(30)));
//! ```

mod error;
pub mod kinds;
pub mod processors;
mod registry;
pub mod types;

pub use error::{FieldError, Result};
pub use kinds::{KindNormalizer, KindRegistry};
pub use processors::{messages, FieldProcessor, Verdict};
pub use registry::{ProcessorRegistry, ValidationReport};
pub use types::{FieldDefId, FieldDefinition, FieldKind, Validators};
