//! Core record and directory types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use ulid::Ulid;

use crate::error::{RecordError, Result};
use dossier_fields::FieldDefinition;

/// Partition key for record storage. Every read and write is scoped by
/// tenant; records from one tenant are invisible to every other.
///
/// A tenant is derived from the owning application and directory, so two
/// directories never share a record namespace even within one application.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    /// The single derivation: one tenant per directory within an
    /// application.
    pub fn derive(app_id: &str, directory_id: &str) -> Self {
        Self(format!(
            "{}__{}",
            sanitize_component(app_id),
            sanitize_component(directory_id)
        ))
    }

    /// Wrap an already-derived tenant value.
    pub fn from_string(value: impl Into<String>) -> Self {
        Self(sanitize_component(&value.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TenantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tenant values become directory names on disk, so anything outside a
/// conservative character set is mapped away.
fn sanitize_component(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// Unique identifier for a record (ULID).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
pub struct RecordId(Ulid);

impl RecordId {
    /// Generate a new unique record ID.
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    /// Parse a record ID from its string form.
    pub fn parse(s: &str) -> Result<Self> {
        Ulid::from_string(s)
            .map(Self)
            .map_err(|_| RecordError::invalid_id(s))
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored record: one instance of a directory's schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: RecordId,
    pub tenant_id: TenantId,
    /// Optimistic concurrency token. Starts at 1, +1 per successful write.
    pub version: u64,
    /// Declared props only; values already transformed by their processor.
    pub props: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_by: String,
    /// Set on soft delete. Deleted records stay on disk but are excluded
    /// from every read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Record {
    /// Create a new live record at version 1.
    pub fn new(tenant_id: TenantId, props: Map<String, Value>, actor: impl Into<String>) -> Self {
        let actor = actor.into();
        let now = Utc::now();
        Self {
            id: RecordId::new(),
            tenant_id,
            version: 1,
            props,
            created_at: now,
            updated_at: now,
            created_by: actor.clone(),
            updated_by: actor,
            deleted_at: None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Record a successful write: bump the version and refresh the update
    /// audit fields.
    pub fn touch(&mut self, actor: impl Into<String>) {
        self.version += 1;
        self.updated_at = Utc::now();
        self.updated_by = actor.into();
    }

    /// Soft-delete: stamp `deletedAt` and bump the version. The row is
    /// never physically removed by the store.
    pub fn mark_deleted(&mut self, actor: impl Into<String>) {
        self.deleted_at = Some(Utc::now());
        self.touch(actor);
    }
}

/// A directory: a named, independently schema'd collection of records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Directory {
    pub id: String,
    /// URL-friendly handle; resolvable interchangeably with the id.
    pub slug: String,
    pub name: String,
}

impl Directory {
    pub fn new(
        id: impl Into<String>,
        slug: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            slug: slug.into(),
            name: name.into(),
        }
    }
}

/// A resolved directory together with its live field definitions. Also
/// the on-disk shape of one directory schema file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectorySchema {
    pub directory: Directory,
    /// Ordered by key for stable iteration.
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tenant_derivation_is_stable_and_path_safe() {
        let a = TenantId::derive("app1", "dir_users");
        let b = TenantId::derive("app1", "dir_users");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "app1__dir_users");

        let weird = TenantId::derive("app/1", "../etc");
        assert!(!weird.as_str().contains('/'));
        assert!(!weird.as_str().contains(".."));
    }

    #[test]
    fn distinct_directories_get_distinct_tenants() {
        let a = TenantId::derive("app1", "users");
        let b = TenantId::derive("app1", "orders");
        assert_ne!(a, b);
    }

    #[test]
    fn record_id_round_trip() {
        let id = RecordId::new();
        assert_eq!(RecordId::parse(&id.to_string()).unwrap(), id);
        assert!(RecordId::parse("nope").is_err());
    }

    #[test]
    fn new_record_starts_at_version_one() {
        let props = json!({ "name": "Ana" });
        let record = Record::new(
            TenantId::derive("app", "dir"),
            props.as_object().unwrap().clone(),
            "tester",
        );
        assert_eq!(record.version, 1);
        assert_eq!(record.created_by, "tester");
        assert_eq!(record.updated_by, "tester");
        assert!(!record.is_deleted());
        assert_eq!(record.created_at, record.updated_at);
    }

    #[test]
    fn touch_bumps_version_and_actor() {
        let mut record = Record::new(TenantId::derive("app", "dir"), Map::new(), "creator");
        record.touch("editor");
        assert_eq!(record.version, 2);
        assert_eq!(record.created_by, "creator");
        assert_eq!(record.updated_by, "editor");
    }

    #[test]
    fn mark_deleted_sets_timestamp_and_bumps_version() {
        let mut record = Record::new(TenantId::derive("app", "dir"), Map::new(), "creator");
        record.mark_deleted("reaper");
        assert!(record.is_deleted());
        assert_eq!(record.version, 2);
        assert_eq!(record.updated_by, "reaper");
    }

    #[test]
    fn record_json_uses_camel_case_and_omits_live_deleted_at() {
        let record = Record::new(TenantId::derive("app", "dir"), Map::new(), "tester");
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("tenantId"));
        assert!(json.contains("createdAt"));
        assert!(!json.contains("deletedAt"));

        let parsed: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }
}
