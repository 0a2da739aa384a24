//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::response::{IntoResponse, Response};
use chrono::DateTime;
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// `Authorization` header present but not `Bearer <token>`
    #[error("Bad authentication header")]
    BadHeader,

    /// Signature, algorithm or structure of the token is wrong
    #[error("Invalid Token")]
    InvalidToken,

    /// Token expiry is at or before now (seconds since epoch)
    #[error("Token expired at {}", format_instant(*.0))]
    TokenExpired(i64),

    /// Protected route called without any token
    #[error("Must provide a valid JWT Token")]
    MissingToken,
}

impl AuthError {
    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::BadHeader | AuthError::MissingToken => ErrorKind::BadRequest,
            AuthError::InvalidToken | AuthError::TokenExpired(_) => ErrorKind::Unauthorized,
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::MissingToken => {
                tracing::info!("Attempted to make unauthenticated request");
            }
            _ => {
                tracing::info!(error = %self, "Failed to parse token");
            }
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::new(err.kind(), err.to_string())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        AppError::from(self).into_response()
    }
}

impl From<platform::client::BearerError> for AuthError {
    fn from(err: platform::client::BearerError) -> Self {
        match err {
            platform::client::BearerError::Malformed => AuthError::BadHeader,
        }
    }
}

fn format_instant(secs: i64) -> String {
    DateTime::from_timestamp(secs, 0)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| secs.to_string())
}
