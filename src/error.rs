//! Unified error handling for userd.
//!
//! Maps storage-layer failures onto HTTP responses and metric labels.

use crate::db::DbError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors surfaced by request handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("user already exists: {0}")]
    UserExists(String),

    #[error("user not found: {0}")]
    UserNotFound(i64),

    #[error("database error: {0}")]
    Database(DbError),
}

impl ApiError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UserExists(_) => "user_exists",
            Self::UserNotFound(_) => "user_not_found",
            Self::Database(_) => "database_error",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::UserExists(_) => StatusCode::CONFLICT,
            Self::UserNotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::UserExists(email) => ApiError::UserExists(email),
            DbError::UserNotFound(id) => ApiError::UserNotFound(id),
            other => ApiError::Database(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        crate::metrics::record_handler_error(self.error_code());

        let body = Json(serde_json::json!({
            "error": {
                "code": self.error_code(),
                "message": self.to_string(),
            }
        }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_errors_map_to_api_variants() {
        let err: ApiError = DbError::UserExists("a@b.com".into()).into();
        assert!(matches!(err, ApiError::UserExists(_)));
        assert_eq!(err.status(), StatusCode::CONFLICT);

        let err: ApiError = DbError::UserNotFound(7).into();
        assert!(matches!(err, ApiError::UserNotFound(7)));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err: ApiError = DbError::Internal("boom".into()).into();
        assert!(matches!(err, ApiError::Database(_)));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(
            ApiError::UserExists("a@b.com".into()).error_code(),
            "user_exists"
        );
        assert_eq!(ApiError::UserNotFound(1).error_code(), "user_not_found");
    }
}
