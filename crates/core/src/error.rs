use serde::Serialize;
use thiserror::Error;

use crate::types::StandardResponse;

/// Engine error types.
///
/// Each variant maps to an HTTP status code via [`AuthError::status_code`]
/// and a stable machine-readable code via [`AuthError::code`]. Use
/// [`AuthError::into_response`] to render `{ "code": "...", "message": "..." }`.
#[derive(Error, Debug)]
pub enum AuthError {
    // --- 400 Bad Request ---
    #[error("{0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(String),

    // --- 401 Unauthorized ---
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Session not found or expired")]
    SessionNotFound,

    // --- 403 Forbidden ---
    #[error("{0}")]
    Forbidden(String),

    // --- 404 Not Found ---
    #[error("User not found")]
    UserNotFound,

    #[error("{0}")]
    NotFound(String),

    // --- 409 Conflict ---
    #[error("{0}")]
    Conflict(String),

    // --- 500 Internal Server Error ---
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Hook error on {path}: {message}")]
    Hook { path: String, message: String },

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    code: &'a str,
    message: String,
}

impl AuthError {
    /// HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) | Self::Validation(_) => 400,
            Self::InvalidCredentials | Self::Unauthenticated | Self::SessionNotFound => 401,
            Self::Forbidden(_) => 403,
            Self::UserNotFound | Self::NotFound(_) => 404,
            Self::Conflict(_) => 409,
            Self::Config(_)
            | Self::Serialization(_)
            | Self::Hook { .. }
            | Self::Internal(_)
            | Self::PasswordHash(_) => 500,
        }
    }

    /// Stable, machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidCredentials => "INVALID_EMAIL_OR_PASSWORD",
            Self::Unauthenticated => "UNAUTHORIZED",
            Self::SessionNotFound => "SESSION_NOT_FOUND",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::Config(_)
            | Self::Serialization(_)
            | Self::Hook { .. }
            | Self::Internal(_)
            | Self::PasswordHash(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    /// Render this error as a JSON [`StandardResponse`].
    ///
    /// Internal errors (500) use a generic message to avoid leaking details.
    pub fn into_response(self) -> StandardResponse {
        let status = self.status_code();
        let message = match status {
            500 => "Internal server error".to_string(),
            _ => self.to_string(),
        };

        StandardResponse::json(
            status,
            &ErrorBody {
                code: self.code(),
                message: message.clone(),
            },
        )
        .unwrap_or_else(|_| StandardResponse::text(status, message))
    }

    // --- Constructors ---

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn hook(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Hook {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

pub type AuthResult<T> = Result<T, AuthError>;
