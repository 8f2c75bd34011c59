//! Application Error Types
//!
//! One crate-wide error enum so every operation reports through the same
//! taxonomy and every handler maps to HTTP the same way.

use thiserror::Error;

/// Application error taxonomy.
///
/// Business errors are returned synchronously to the caller and never
/// swallowed. `Database` and `Internal` carry context for the logs but are
/// rendered to untrusted callers as a generic failure.
#[derive(Error, Debug, Clone)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// Transient store failure, retryable by the caller with backoff.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        AppError::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        AppError::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        AppError::Conflict(msg.into())
    }

    /// Get the error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Unavailable(_) => "UNAVAILABLE",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get HTTP status code suggestion
    pub fn http_status(&self) -> u16 {
        match self {
            AppError::Validation(_) => 400,
            AppError::Unauthorized(_) => 401,
            AppError::Forbidden(_) => 403,
            AppError::NotFound(_) => 404,
            AppError::Conflict(_) => 409,
            AppError::Unavailable(_) => 503,
            AppError::Database(_) | AppError::Internal(_) => 500,
        }
    }

    /// Whether the message is safe to echo to an untrusted caller.
    pub fn is_public(&self) -> bool {
        !matches!(self, AppError::Database(_) | AppError::Internal(_))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        // Pool exhaustion and connection-level IO are transient: the caller
        // may retry with backoff.
        let transient = matches!(
            e,
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)
        );
        if transient {
            AppError::Unavailable(e.to_string())
        } else {
            AppError::Database(e.to_string())
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        AppError::Internal(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(AppError::validation("x").code(), "VALIDATION");
        assert_eq!(AppError::conflict("x").code(), "CONFLICT");
        assert_eq!(AppError::Unavailable("x".into()).code(), "UNAVAILABLE");
    }

    #[test]
    fn test_http_status() {
        assert_eq!(AppError::validation("x").http_status(), 400);
        assert_eq!(AppError::unauthorized("x").http_status(), 401);
        assert_eq!(AppError::forbidden("x").http_status(), 403);
        assert_eq!(AppError::not_found("x").http_status(), 404);
        assert_eq!(AppError::conflict("x").http_status(), 409);
        assert_eq!(AppError::Unavailable("x".into()).http_status(), 503);
        assert_eq!(AppError::Database("x".into()).http_status(), 500);
        assert_eq!(AppError::Internal("x".into()).http_status(), 500);
    }

    #[test]
    fn test_pool_timeout_is_unavailable() {
        let err: AppError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, AppError::Unavailable(_)));

        let err: AppError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, AppError::Database(_)));
    }

    #[test]
    fn test_internal_detail_not_public() {
        assert!(!AppError::Database("connection string leaked".into()).is_public());
        assert!(!AppError::Internal("stack trace".into()).is_public());
        assert!(AppError::validation("missing field").is_public());
    }
}
