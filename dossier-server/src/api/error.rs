//! HTTP error responses.
//!
//! Every failure leaving the API uses one envelope:
//! `{"success": false, "error": "...", "details": {field: message}?}`.
//! `details` is present only for validation failures.

use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use dossier_records::RecordError;
use serde::Serialize;

/// Failure envelope body.
#[derive(Debug, Serialize)]
pub struct FailureBody {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<BTreeMap<String, String>>,
}

/// An HTTP status paired with the failure envelope.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: FailureBody,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            body: FailureBody {
                success: false,
                error: error.into(),
                details: None,
            },
        }
    }

    pub fn bad_request(error: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error)
    }

    pub fn not_found(error: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, error)
    }

    fn validation(details: BTreeMap<String, String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: FailureBody {
                success: false,
                error: "validation failed".to_string(),
                details: Some(details),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<RecordError> for ApiError {
    fn from(err: RecordError) -> Self {
        match err {
            RecordError::Validation { details } => Self::validation(details),
            RecordError::DirectoryNotFound { .. }
            | RecordError::RecordNotFound { .. }
            | RecordError::InvalidId { .. } => Self::not_found(err.to_string()),
            RecordError::VersionConflict { .. } | RecordError::LockBusy { .. } => {
                Self::new(StatusCode::CONFLICT, err.to_string())
            }
            RecordError::DuplicateFieldKey { .. } | RecordError::SlugConflict { .. } => {
                Self::new(StatusCode::CONFLICT, err.to_string())
            }
            RecordError::Schema(_) | RecordError::Io(_) | RecordError::Json(_) => {
                // Log the cause server-side; the client gets a generic message.
                tracing::error!(error = %err, "internal error serving request");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dossier_records::RecordError;

    #[test]
    fn record_errors_map_to_expected_statuses() {
        let not_found: ApiError = RecordError::record_not_found("01ARZ").into();
        assert_eq!(not_found.status, StatusCode::NOT_FOUND);
        assert!(not_found.body.details.is_none());

        let missing_dir: ApiError = RecordError::directory_not_found("contacts").into();
        assert_eq!(missing_dir.status, StatusCode::NOT_FOUND);

        let conflict: ApiError = RecordError::version_conflict("01ARZ", 1, 2).into();
        assert_eq!(conflict.status, StatusCode::CONFLICT);

        let busy: ApiError = RecordError::LockBusy {
            id: "01ARZ".to_string(),
        }
        .into();
        assert_eq!(busy.status, StatusCode::CONFLICT);

        let bad_id: ApiError = RecordError::invalid_id("nope").into();
        assert_eq!(bad_id.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn validation_errors_carry_details() {
        let mut details = BTreeMap::new();
        details.insert("age".to_string(), "数值不能大于150".to_string());

        let err: ApiError = RecordError::validation(details).into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        let details = err.body.details.unwrap();
        assert_eq!(details.get("age").unwrap(), "数值不能大于150");
    }

    #[test]
    fn io_errors_do_not_leak_into_the_body() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "secret path");
        let err: ApiError = RecordError::from(io).into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.body.error, "internal error");
    }
}
