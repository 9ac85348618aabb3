// crates/backend-lib/src/error.rs

//! Central error type + Axum integration.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use feedback_common::FormErrors;
use thiserror::Error;

/// Application error types with error codes and context
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid form input")]
    Validation(FormErrors),

    #[error("Incorrect username or password")]
    AuthenticationFailed,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Username already taken: {0}")]
    UsernameTaken(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::AuthenticationFailed | AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::UsernameTaken(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VAL_001",
            AppError::AuthenticationFailed => "AUTH_001",
            AppError::Unauthorized(_) => "AUTH_002",
            AppError::NotFound(_) => "NF_001",
            AppError::UsernameTaken(_) => "USER_001",
            AppError::Io(_) => "IO_001",
            AppError::Json(_) => "JSON_001",
            AppError::Internal(_) => "INT_001",
        }
    }

    /// Get a sanitized message suitable for production use
    pub fn sanitized_message(&self) -> String {
        match self {
            AppError::Validation(_) => "Invalid form input".to_string(),
            AppError::AuthenticationFailed => "Incorrect username or password".to_string(),
            AppError::Unauthorized(_) => "You are not authorized to access this page".to_string(),
            AppError::NotFound(_) => "Resource not found".to_string(),
            AppError::UsernameTaken(_) => "Username is already taken".to_string(),
            AppError::Io(_) => "Internal server error".to_string(),
            AppError::Json(_) => "Invalid request format".to_string(),
            AppError::Internal(_) => "An internal server error occurred".to_string(),
        }
    }

    /// Field-level errors to surface inline, where the error carries them.
    fn field_errors(&self) -> Option<FormErrors> {
        match self {
            AppError::Validation(errors) => Some(errors.clone()),
            AppError::AuthenticationFailed => {
                // Generic on purpose: never reveals whether the username exists
                let mut errors = FormErrors::default();
                errors.push("username", "Incorrect username or password");
                Some(errors)
            },
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        // Use detailed messages in development, sanitized in production
        let message = if cfg!(debug_assertions) {
            self.to_string()
        } else {
            self.sanitized_message()
        };

        let body = match self.field_errors() {
            Some(errors) => serde_json::json!({
                "error": {
                    "code": error_code,
                    "message": message,
                    "fields": errors.errors,
                }
            }),
            None => serde_json::json!({
                "error": {
                    "code": error_code,
                    "message": message,
                }
            }),
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Internal(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Internal(msg.to_string())
    }
}
