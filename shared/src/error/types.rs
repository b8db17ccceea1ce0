//! Error type and its JSON response body

use super::codes::ErrorCode;
use http::StatusCode;
use serde_json::{Map, Value};
use thiserror::Error;

/// Application error with structured error code and details
///
/// The response body is a flat JSON object: `{"error": <code name>, ...details}`.
/// The message is developer-facing and only appears in logs and `Display`.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    /// The error code identifying the type of error
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Extra body fields (field name, upstream code, ...)
    pub details: Option<Map<String, Value>>,
}

impl AppError {
    /// Create a new error with the default message for the error code
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.message().to_string(),
            code,
            details: None,
        }
    }

    /// Create a new error with a custom message
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Add a detail entry to this error
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    /// Get the HTTP status code for this error
    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    /// JSON body sent to the client
    pub fn body(&self) -> Value {
        let mut body = Map::new();
        body.insert("error".to_string(), Value::from(self.code.name()));
        if let Some(details) = &self.details {
            for (key, value) in details {
                body.insert(key.clone(), value.clone());
            }
        }
        Value::Object(body)
    }

    // ==================== Convenience constructors ====================

    /// Create an unauthorized error
    pub fn unauthorized() -> Self {
        Self::new(ErrorCode::Unauthorized)
    }

    /// Create a missing query parameters error
    pub fn missing_params() -> Self {
        Self::new(ErrorCode::MissingParameters)
    }

    /// Create an invalid query parameter error naming the parameter
    pub fn invalid_param(field: &str) -> Self {
        Self::with_message(
            ErrorCode::InvalidParameters,
            format!("Invalid query parameter: {field}"),
        )
        .with_detail("field", field)
    }

    /// Create a missing payload fields error
    pub fn missing_fields() -> Self {
        Self::new(ErrorCode::MissingFields)
    }

    /// Create an invalid payload field error naming the field
    pub fn invalid_field(field: &str) -> Self {
        Self::with_message(ErrorCode::InvalidFields, format!("Invalid field: {field}"))
            .with_detail("field", field)
    }

    /// Create a field-too-long error naming the field and its cap
    pub fn field_too_long(field: &str, max: usize) -> Self {
        Self::with_message(
            ErrorCode::FieldTooLong,
            format!("Field {field} exceeds {max} characters"),
        )
        .with_detail("field", field)
        .with_detail("max", max)
    }

    /// Create a database error carrying the upstream diagnostics
    pub fn database(code: Option<String>, message: impl Into<String>) -> Self {
        let message = message.into();
        Self::with_message(ErrorCode::DatabaseError, message.clone())
            .with_detail("code", code.map(Value::from).unwrap_or(Value::Null))
            .with_detail("message", message)
    }
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

// ===== Axum Integration =====

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;

        let status = self.http_status();

        // Log system errors
        if self.code.is_system() {
            tracing::error!(
                code = %self.code,
                message = %self.message,
                "System error occurred"
            );
        }

        (status, Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_new() {
        let err = AppError::new(ErrorCode::MissingFields);
        assert_eq!(err.code, ErrorCode::MissingFields);
        assert_eq!(err.message, ErrorCode::MissingFields.message());
        assert!(err.details.is_none());
    }

    #[test]
    fn test_app_error_body_is_flat() {
        assert_eq!(
            AppError::missing_params().body(),
            serde_json::json!({"error": "missing_params"})
        );
        assert_eq!(
            AppError::field_too_long("nota", 500).body(),
            serde_json::json!({"error": "field_too_long", "field": "nota", "max": 500})
        );
    }

    #[test]
    fn test_database_error_carries_diagnostics() {
        let err = AppError::database(Some("42S02".to_string()), "Table doesn't exist");
        assert_eq!(err.http_status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            err.body(),
            serde_json::json!({
                "error": "database_error",
                "code": "42S02",
                "message": "Table doesn't exist",
            })
        );

        let err = AppError::database(None, "pool timed out");
        assert_eq!(err.body()["code"], Value::Null);
    }

    #[test]
    fn test_app_error_http_status() {
        assert_eq!(
            AppError::unauthorized().http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::invalid_field("covers").http_status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::invalid_param("date");
        assert_eq!(format!("{}", err), "Invalid query parameter: date");
    }
}
