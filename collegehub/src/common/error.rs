//! エラー型定義
//!
//! 統一エラー型（thiserror使用）
//!
//! `HubError`は`external_message()`と`status_code()`を提供し、
//! 内部情報を含まないAPIエラーレスポンスを生成できる。

use axum::http::StatusCode;
use thiserror::Error;

/// Common layer error type
#[derive(Debug, Error)]
pub enum CommonError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

/// collegehub error type
#[derive(Debug, Error)]
pub enum HubError {
    /// Common layer error
    #[error(transparent)]
    Common(#[from] CommonError),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Password hash error
    #[error("Password hash error: {0}")]
    PasswordHash(String),

    /// JWT error
    #[error("JWT error: {0}")]
    Jwt(String),

    /// Authentication error
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Authorization error
    #[error("Authorization error: {0}")]
    Authorization(String),

    /// Conflict error (e.g., duplicate resource)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Request body exceeds the configured limit
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// Audit persistence error (never surfaced to API callers)
    #[error("Audit persistence error: {0}")]
    AuditPersistence(String),
}

impl HubError {
    /// Returns a safe error message for external clients.
    ///
    /// Full error details (`to_string()`) belong in server logs only.
    pub fn external_message(&self) -> &'static str {
        match self {
            Self::Common(CommonError::Validation(_)) => "The given data was invalid.",
            Self::Common(_) => "Request error",
            Self::NotFound(_) => "Not found",
            Self::Database(_) => "Database error",
            Self::Internal(_) => "Internal server error",
            Self::PasswordHash(_) => "Authentication error",
            Self::Jwt(_) => "Unauthenticated.",
            Self::Authentication(_) => "Unauthenticated.",
            Self::Authorization(_) => "Access denied",
            Self::Conflict(_) => "Resource conflict",
            Self::PayloadTooLarge(_) => "The request body is too large.",
            Self::AuditPersistence(_) => "Internal server error",
        }
    }

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Common(CommonError::Validation(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Common(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::PasswordHash(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Jwt(_) => StatusCode::UNAUTHORIZED,
            Self::Authentication(_) => StatusCode::UNAUTHORIZED,
            Self::Authorization(_) => StatusCode::FORBIDDEN,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::AuditPersistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Result type alias (collegehub)
pub type HubResult<T> = Result<T, HubError>;
