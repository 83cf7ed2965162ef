//! Error types for field processing

use thiserror::Error;

/// Result type for field processing operations
pub type Result<T> = std::result::Result<T, FieldError>;

/// Errors that can occur while resolving or applying field processors
#[derive(Debug, Error)]
pub enum FieldError {
    /// No structural normalizer registered for a field kind. Unlike an
    /// unknown type (which falls back to text), an unknown kind is a
    /// configuration fault and aborts the operation.
    #[error("no processor registered for field kind: {kind}")]
    UnknownKind { kind: String },

    /// Identifier failed to parse
    #[error("invalid identifier: {id}")]
    InvalidId { id: String },

    /// A field definition carries configuration its processor cannot use
    #[error("invalid configuration for field '{key}': {message}")]
    InvalidConfig { key: String, message: String },
}

impl FieldError {
    /// Create an unknown kind error
    pub fn unknown_kind(kind: impl Into<String>) -> Self {
        Self::UnknownKind { kind: kind.into() }
    }

    /// Create an invalid identifier error
    pub fn invalid_id(id: impl Into<String>) -> Self {
        Self::InvalidId { id: id.into() }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            key: key.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FieldError::unknown_kind("mystery");
        assert_eq!(
            err.to_string(),
            "no processor registered for field kind: mystery"
        );
    }

    #[test]
    fn test_invalid_config_display() {
        let err = FieldError::invalid_config("tags", "options must be an array");
        assert!(err.to_string().contains("tags"));
        assert!(err.to_string().contains("options must be an array"));
    }
}
