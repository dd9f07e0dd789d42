//! API error handling for the catnews HTTP layer.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::collections::HashMap;

use crate::CatnewsError;

/// API error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Bad request (400).
    BadRequest,
    /// Unauthorized (401).
    Unauthorized,
    /// Not found (404).
    NotFound,
    /// Conflict (409).
    Conflict,
    /// Validation error (422), with field-level details.
    ValidationError,
    /// Internal server error (500).
    InternalError,
    /// Upstream feed or generation service failure (502).
    BadGateway,
}

impl ErrorCode {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::BadRequest => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::ValidationError => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::BadGateway => StatusCode::BAD_GATEWAY,
        }
    }
}

/// API error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Error details.
    pub error: ErrorDetail,
}

/// Error detail.
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    /// Error code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
    /// Field-level validation details (validation errors only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Vec<String>>>,
}

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    code: ErrorCode,
    message: String,
    details: Option<HashMap<String, Vec<String>>>,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Create a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    /// Create an unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Create a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    /// Create an internal server error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Create a bad gateway error.
    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadGateway, message)
    }

    /// Create a validation error from validator::ValidationErrors.
    pub fn from_validation_errors(errors: validator::ValidationErrors) -> Self {
        let mut details: HashMap<String, Vec<String>> = HashMap::new();

        for (field, field_errors) in errors.field_errors() {
            let messages: Vec<String> = field_errors
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value for {}", field))
                })
                .collect();
            details.insert(field.to_string(), messages);
        }

        Self {
            code: ErrorCode::ValidationError,
            message: "Validation failed".to_string(),
            details: Some(details),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.code.status_code();
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
                details: self.details,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<CatnewsError> for ApiError {
    fn from(err: CatnewsError) -> Self {
        match &err {
            CatnewsError::DuplicateEmail | CatnewsError::DuplicateUsername => {
                ApiError::conflict(err.to_string())
            }
            CatnewsError::InvalidCredentials => ApiError::unauthorized(err.to_string()),
            CatnewsError::InvalidToken(_) => {
                ApiError::unauthorized("Invalid or expired token")
            }
            CatnewsError::NotFound(_) => ApiError::not_found(err.to_string()),
            CatnewsError::Fetch(_) | CatnewsError::Generation(_) | CatnewsError::OAuth(_) => {
                ApiError::bad_gateway(err.to_string())
            }
            _ => {
                tracing::error!("Internal error: {}", err);
                ApiError::internal("An internal error occurred")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_status() {
        assert_eq!(ErrorCode::BadRequest.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ErrorCode::Unauthorized.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ErrorCode::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::Conflict.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ErrorCode::ValidationError.status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(ErrorCode::BadGateway.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_duplicate_maps_to_conflict() {
        let err = ApiError::from(CatnewsError::DuplicateEmail);
        assert_eq!(err.code, ErrorCode::Conflict);

        let err = ApiError::from(CatnewsError::DuplicateUsername);
        assert_eq!(err.code, ErrorCode::Conflict);
    }

    #[test]
    fn test_auth_errors_map_to_unauthorized() {
        let err = ApiError::from(CatnewsError::InvalidCredentials);
        assert_eq!(err.code, ErrorCode::Unauthorized);

        let err = ApiError::from(CatnewsError::InvalidToken("expired".to_string()));
        assert_eq!(err.code, ErrorCode::Unauthorized);
    }

    #[test]
    fn test_upstream_errors_map_to_bad_gateway() {
        let err = ApiError::from(CatnewsError::Fetch("down".to_string()));
        assert_eq!(err.code, ErrorCode::BadGateway);

        let err = ApiError::from(CatnewsError::Generation("down".to_string()));
        assert_eq!(err.code, ErrorCode::BadGateway);
    }

    #[test]
    fn test_not_found_maps() {
        let err = ApiError::from(CatnewsError::NotFound("feed".to_string()));
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[test]
    fn test_database_error_is_hidden() {
        let err = ApiError::from(CatnewsError::Database("secret detail".to_string()));
        assert_eq!(err.code, ErrorCode::InternalError);
        assert!(!err.message.contains("secret detail"));
    }
}
