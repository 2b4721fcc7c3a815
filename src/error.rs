//! Error types and error handling for the application
//!
//! This module defines custom error types that can be converted to HTTP responses.
//! All errors implement `IntoResponse` to provide consistent error formatting.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error types
///
/// Absence of a requested identity is normally an `Ok(None)` from the store
/// and services; `NotFound` is what handlers turn that into.
#[derive(Error, Debug)]
pub enum AppError {
    /// Requested record does not exist
    #[error("{0} not found")]
    NotFound(String),

    /// A field value is malformed or out of range
    #[error("Validation error: {0}")]
    Validation(String),

    /// Page number or page size outside the accepted range
    #[error("Invalid pagination: {0}")]
    InvalidPagination(String),

    /// A foreign key points at a record that does not exist
    #[error("{0} not found")]
    ReferenceNotFound(String),

    /// Another record already holds this unique name
    #[error("{entity} with name \"{name}\" already exists")]
    DuplicateName {
        /// Kind of record, e.g. "Pet type"
        entity: &'static str,
        /// The conflicting name
        name: String,
    },

    /// Birth or visit date lies in the future
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Delete blocked because other records still reference this one
    #[error("Cannot delete {0}")]
    HasDependents(String),

    /// Store-level integrity failure not otherwise categorized
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// The store failed or is unavailable
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    /// Internal server error (catch-all for unexpected errors)
    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_error) = &error {
            if db_error.is_unique_violation()
                || db_error.is_foreign_key_violation()
                || db_error.is_check_violation()
                || matches!(db_error.kind(), sqlx::error::ErrorKind::NotNullViolation)
            {
                return AppError::ConstraintViolation(db_error.message().to_string());
            }
        }
        AppError::Database(error)
    }
}

impl AppError {
    /// HTTP status this error is reported with
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_)
            | AppError::InvalidPagination(_)
            | AppError::ReferenceNotFound(_)
            | AppError::InvalidDate(_) => StatusCode::BAD_REQUEST,
            AppError::DuplicateName { .. }
            | AppError::HasDependents(_)
            | AppError::ConstraintViolation(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = Json(json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::NotFound("Owner".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::ReferenceNotFound("Owner".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::DuplicateName {
                entity: "Pet type",
                name: "Cat".into()
            }
            .status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::HasDependents("pet type".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Database(sqlx::Error::PoolTimedOut).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_messages() {
        let err = AppError::DuplicateName {
            entity: "Specialty",
            name: "Surgery".into(),
        };
        assert_eq!(err.to_string(), "Specialty with name \"Surgery\" already exists");
        assert_eq!(AppError::NotFound("Pet".into()).to_string(), "Pet not found");
    }

    #[test]
    fn test_non_constraint_sqlx_error_is_database() {
        let err: AppError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, AppError::Database(_)));
    }
}
