//! Unified application error model and HTTP mapping.
//! Handlers translate every fault into this taxonomy at their own boundary;
//! nothing crosses the process edge with internal detail attached.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppError {
    /// Missing or malformed input from the caller (400).
    #[error("{code}: {message}")]
    UserInput { code: String, message: String },
    /// Missing, expired or invalid token, or a token whose subject no longer exists (401).
    #[error("{code}: {message}")]
    Auth { code: String, message: String },
    /// Resource absent by id (404).
    #[error("{code}: {message}")]
    NotFound { code: String, message: String },
    /// Uniqueness violation, e.g. duplicate registration email (409).
    #[error("{code}: {message}")]
    Conflict { code: String, message: String },
    /// Anything unexpected (500). The wire message is suppressed to a generic
    /// string; the original fault is logged server-side only.
    #[error("{code}: {message}")]
    Internal { code: String, message: String },
}

impl AppError {
    pub fn code_str(&self) -> &str {
        match self {
            AppError::UserInput { code, .. }
            | AppError::Auth { code, .. }
            | AppError::NotFound { code, .. }
            | AppError::Conflict { code, .. }
            | AppError::Internal { code, .. } => code.as_str(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::UserInput { message, .. }
            | AppError::Auth { message, .. }
            | AppError::NotFound { message, .. }
            | AppError::Conflict { message, .. }
            | AppError::Internal { message, .. } => message.as_str(),
        }
    }

    pub fn user(code: impl Into<String>, msg: impl Into<String>) -> Self { AppError::UserInput { code: code.into(), message: msg.into() } }
    pub fn auth(code: impl Into<String>, msg: impl Into<String>) -> Self { AppError::Auth { code: code.into(), message: msg.into() } }
    pub fn not_found(code: impl Into<String>, msg: impl Into<String>) -> Self { AppError::NotFound { code: code.into(), message: msg.into() } }
    pub fn conflict(code: impl Into<String>, msg: impl Into<String>) -> Self { AppError::Conflict { code: code.into(), message: msg.into() } }
    pub fn internal(code: impl Into<String>, msg: impl Into<String>) -> Self { AppError::Internal { code: code.into(), message: msg.into() } }

    /// Map to HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            AppError::UserInput { .. } => 400,
            AppError::Auth { .. } => 401,
            AppError::NotFound { .. } => 404,
            AppError::Conflict { .. } => 409,
            AppError::Internal { .. } => 500,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal { code: "internal".into(), message: err.to_string() }
    }
}

/// Wire shape shared by every failing endpoint: `{"error": {"message", "status"}}`.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let message = match &self {
            AppError::Internal { code, message } => {
                error!(code = %code, "internal fault: {message}");
                "Internal server error".to_string()
            }
            other => other.message().to_string(),
        };
        let body = Json(json!({ "error": { "message": message, "status": status.as_u16() } }));
        (status, body).into_response()
    }
}
