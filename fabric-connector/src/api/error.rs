//! API error handling.
//!
//! Maps pipeline failures onto HTTP status codes with a stable error code so
//! clients can tell a bad request from a broken tool.

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::error::Error;

/// API error response body.
#[derive(Debug, Serialize)]
pub struct ApiErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Additional error details (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// API error type that can be converted to HTTP responses.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Add details to the error.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Create a 422 Unprocessable Entity error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR", message)
    }

    /// Create a 502 Bad Gateway error for a failed external tool.
    pub fn external_tool(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, "EXTERNAL_TOOL_ERROR", message)
    }

    /// Create a 502 Bad Gateway error for a tool that could not be started.
    pub fn tool_unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, "TOOL_UNAVAILABLE", message)
    }

    /// Create a 504 Gateway Timeout error.
    pub fn tool_timeout(message: impl Into<String>) -> Self {
        Self::new(StatusCode::GATEWAY_TIMEOUT, "TOOL_TIMEOUT", message)
    }

    /// Create a 500 Internal Server Error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorResponse {
            code: self.code,
            message: self.message,
            details: self.details,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Validation(msg) => ApiError::validation(msg),
            Error::ExternalTool {
                ref program,
                exit_code,
                ref stderr,
            } => {
                tracing::warn!(program = %program, exit_code, "External tool failed");
                let details = serde_json::json!({
                    "program": program,
                    "exit_code": exit_code,
                    "stderr": stderr,
                });
                ApiError::external_tool(err.to_string()).with_details(details)
            }
            Error::Timeout { .. } => {
                tracing::warn!("{}", err);
                ApiError::tool_timeout(err.to_string())
            }
            Error::Spawn { .. } => {
                tracing::error!("{}", err);
                ApiError::tool_unavailable(err.to_string())
            }
            Error::Staging { .. } | Error::Io(_) => {
                tracing::error!("IO error: {}", err);
                ApiError::internal("IO error occurred")
            }
            _ => {
                tracing::error!("Unexpected error: {}", err);
                ApiError::internal("An unexpected error occurred")
            }
        }
    }
}

/// Bodies that parse but miss or mistype a field are validation errors.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(e) => ApiError::validation(e.body_text()),
            other => ApiError::new(other.status(), "INVALID_BODY", other.body_text()),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_creation() {
        let err = ApiError::validation("Pattern is required");
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.code, "VALIDATION_ERROR");
        assert_eq!(err.message, "Pattern is required");
    }

    #[test]
    fn test_external_tool_carries_details() {
        let api_err: ApiError = Error::external_tool("fabric", 1, "boom").into();
        assert_eq!(api_err.status, StatusCode::BAD_GATEWAY);
        assert_eq!(api_err.code, "EXTERNAL_TOOL_ERROR");

        let details = api_err.details.unwrap();
        assert_eq!(details["program"], "fabric");
        assert_eq!(details["exit_code"], 1);
        assert_eq!(details["stderr"], "boom");
    }

    #[test]
    fn test_timeout_and_spawn_mapping() {
        let api_err: ApiError = Error::Timeout {
            program: "whisper".to_string(),
            timeout_secs: 5,
        }
        .into();
        assert_eq!(api_err.status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(api_err.code, "TOOL_TIMEOUT");

        let api_err: ApiError = Error::Spawn {
            program: "yt".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        }
        .into();
        assert_eq!(api_err.status, StatusCode::BAD_GATEWAY);
        assert_eq!(api_err.code, "TOOL_UNAVAILABLE");
    }

    #[test]
    fn test_other_errors_are_internal() {
        let api_err: ApiError = Error::Other("weird".to_string()).into();
        assert_eq!(api_err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(api_err.details.is_none());
    }
}
