//! Error types for the record store

use std::collections::BTreeMap;
use thiserror::Error;

/// Result type for record store operations
pub type Result<T> = std::result::Result<T, RecordError>;

/// Errors that can occur in record store operations
#[derive(Debug, Error)]
pub enum RecordError {
    /// Directory (schema container) not found — distinct from a directory
    /// that exists but has no fields declared
    #[error("directory not found: {slug_or_id}")]
    DirectoryNotFound { slug_or_id: String },

    /// Record not found, or soft-deleted
    #[error("record not found: {id}")]
    RecordNotFound { id: String },

    /// Expected-version precondition failed on update
    #[error("version conflict on record {id}: expected {expected}, stored {stored}")]
    VersionConflict {
        id: String,
        expected: u64,
        stored: u64,
    },

    /// Another writer held the record's file lock for the whole retry window
    #[error("record busy: {id}")]
    LockBusy { id: String },

    /// One or more props failed validation; one message per failing field
    #[error("validation failed for {} field(s)", details.len())]
    Validation { details: BTreeMap<String, String> },

    /// Duplicate field key within one directory
    #[error("duplicate field key '{key}' in directory {directory}")]
    DuplicateFieldKey { directory: String, key: String },

    /// Slug already mapped to a different directory
    #[error("slug '{slug}' already belongs to directory {directory}")]
    SlugConflict { slug: String, directory: String },

    /// Identifier failed to parse
    #[error("invalid record id: {id}")]
    InvalidId { id: String },

    /// Schema-level configuration fault (unknown kind etc.)
    #[error("schema error: {0}")]
    Schema(#[from] dossier_fields::FieldError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RecordError {
    /// Create a directory not found error
    pub fn directory_not_found(slug_or_id: impl Into<String>) -> Self {
        Self::DirectoryNotFound {
            slug_or_id: slug_or_id.into(),
        }
    }

    /// Create a record not found error
    pub fn record_not_found(id: impl Into<String>) -> Self {
        Self::RecordNotFound { id: id.into() }
    }

    /// Create a version conflict error
    pub fn version_conflict(id: impl Into<String>, expected: u64, stored: u64) -> Self {
        Self::VersionConflict {
            id: id.into(),
            expected,
            stored,
        }
    }

    /// Create a validation error from an aggregated failure map
    pub fn validation(details: BTreeMap<String, String>) -> Self {
        Self::Validation { details }
    }

    /// Create an invalid identifier error
    pub fn invalid_id(id: impl Into<String>) -> Self {
        Self::InvalidId { id: id.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RecordError::record_not_found("01ARZ3NDEKTSV4RRFFQ69G5FAV");
        assert_eq!(
            err.to_string(),
            "record not found: 01ARZ3NDEKTSV4RRFFQ69G5FAV"
        );
    }

    #[test]
    fn test_version_conflict_display() {
        let err = RecordError::version_conflict("abc", 1, 2);
        assert!(err.to_string().contains("expected 1"));
        assert!(err.to_string().contains("stored 2"));
    }

    #[test]
    fn test_validation_counts_fields() {
        let mut details = BTreeMap::new();
        details.insert("age".to_string(), "数值不能大于150".to_string());
        details.insert("name".to_string(), "该字段为必填项".to_string());
        let err = RecordError::validation(details);
        assert!(err.to_string().contains("2 field(s)"));
    }
}
