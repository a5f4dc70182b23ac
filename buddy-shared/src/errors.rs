use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::types::ApiErrorResponse;

/// Application error codes following the pattern E{area}{sequence}
///
/// Ranges:
/// - E0xxx: Shared/infrastructure errors
/// - E1xxx: User/course errors
/// - E2xxx: Availability/matching errors
/// - E3xxx: Session negotiation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Shared (E0xxx)
    InternalError,
    ValidationError,
    NotFound,
    BadRequest,

    // Users & courses (E1xxx)
    UserNotFound,
    CourseNotFound,
    NotEnrolled,

    // Availability & matching (E2xxx)
    InvalidRange,
    AvailabilityNotFound,

    // Sessions (E3xxx)
    SessionNotFound,
    ParticipantNotFound,
    SessionClosed,
}

impl ErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            // Shared
            Self::InternalError => "E0001",
            Self::ValidationError => "E0002",
            Self::NotFound => "E0003",
            Self::BadRequest => "E0004",

            // Users & courses
            Self::UserNotFound => "E1001",
            Self::CourseNotFound => "E1002",
            Self::NotEnrolled => "E1003",

            // Availability & matching
            Self::InvalidRange => "E2001",
            Self::AvailabilityNotFound => "E2002",

            // Sessions
            Self::SessionNotFound => "E3001",
            Self::ParticipantNotFound => "E3002",
            Self::SessionClosed => "E3003",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ValidationError | Self::BadRequest | Self::InvalidRange => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound
            | Self::UserNotFound
            | Self::CourseNotFound
            | Self::NotEnrolled
            | Self::AvailabilityNotFound
            | Self::SessionNotFound
            | Self::ParticipantNotFound => StatusCode::NOT_FOUND,
            Self::SessionClosed => StatusCode::CONFLICT,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Known {
        code: ErrorCode,
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Known {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(
        code: ErrorCode,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self::Known {
            code,
            message: message.into(),
            details: Some(details),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    pub fn invalid_range(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRange, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// The error code this error maps to on the wire.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Known { code, .. } => *code,
            Self::Internal(_) => ErrorCode::InternalError,
            Self::Database(diesel::result::Error::NotFound) => ErrorCode::NotFound,
            Self::Database(_) => ErrorCode::InternalError,
            Self::Validation(_) => ErrorCode::ValidationError,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_response) = match &self {
            AppError::Known {
                code,
                message,
                details,
            } => {
                let status = code.status_code();
                let mut resp = ApiErrorResponse::new(code.code(), message);
                if let Some(d) = details {
                    resp = resp.with_details(d.clone());
                }
                (status, resp)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorResponse::new("E0001", "internal server error"),
                )
            }
            AppError::Database(err) => {
                tracing::error!(error = %err, "database error");
                match err {
                    diesel::result::Error::NotFound => (
                        StatusCode::NOT_FOUND,
                        ApiErrorResponse::new("E0003", "resource not found"),
                    ),
                    _ => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ApiErrorResponse::new("E0001", "database error"),
                    ),
                }
            }
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ApiErrorResponse::new("E0002", msg),
            ),
        };

        (status, Json(error_response)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_range_maps_to_bad_request() {
        assert_eq!(ErrorCode::InvalidRange.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::InvalidRange.code(), "E2001");
    }

    #[test]
    fn missing_participant_maps_to_not_found() {
        assert_eq!(
            ErrorCode::ParticipantNotFound.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(ErrorCode::SessionNotFound.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn error_code_accessor_covers_all_variants() {
        let err = AppError::invalid_range("day out of range");
        assert_eq!(err.code(), ErrorCode::InvalidRange);

        let err = AppError::Database(diesel::result::Error::NotFound);
        assert_eq!(err.code(), ErrorCode::NotFound);

        let err = AppError::Validation("bad window".into());
        assert_eq!(err.code(), ErrorCode::ValidationError);
    }
}
