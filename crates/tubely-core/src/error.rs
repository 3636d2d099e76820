//! Error types module
//!
//! All errors that reach the HTTP edge are unified under [`AppError`]. Library
//! crates keep their own `thiserror` enums and convert into `AppError` at the
//! boundary, preserving the failure kind and its cause.
//!
//! The `Database` variant wraps `sqlx::Error` only when the `sqlx` feature is enabled.

use std::io;

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "STORAGE_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("Database error: {0}")]
    Database(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// The caller is authenticated but does not own the resource.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The uploaded file could not be interpreted as a usable video.
    #[error("{kind}: {message}")]
    InvalidMedia { kind: &'static str, message: String },

    /// A processing stage failed on our side (staging, external tools).
    #[error("{kind}: {message}")]
    MediaProcessing { kind: &'static str, message: String },

    /// Writing or signing a processed video against the blob store failed.
    #[error("{kind}: {message}")]
    MediaStorage { kind: &'static str, message: String },

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::InvalidInput(format!("UUID parsing error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::Database(_) => (
            500,
            "DATABASE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::Storage(_) | AppError::MediaStorage { .. } => (
            500,
            "STORAGE_ERROR",
            true,
            Some("Retry the whole upload after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::InvalidInput(_) => (
            400,
            "INVALID_INPUT",
            false,
            Some("Check request parameters and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::NotFound(_) => (
            404,
            "NOT_FOUND",
            false,
            Some("Verify the resource ID exists"),
            false,
            LogLevel::Debug,
        ),
        AppError::PayloadTooLarge(_) => (
            413,
            "PAYLOAD_TOO_LARGE",
            false,
            Some("Reduce file size"),
            false,
            LogLevel::Debug,
        ),
        AppError::UnsupportedMediaType(_) => (
            415,
            "UNSUPPORTED_MEDIA_TYPE",
            false,
            Some("Upload an MP4 file (video/mp4)"),
            false,
            LogLevel::Debug,
        ),
        AppError::Unauthenticated(_) => (
            401,
            "UNAUTHENTICATED",
            false,
            Some("Check the bearer token"),
            false,
            LogLevel::Debug,
        ),
        AppError::Unauthorized(_) => (
            403,
            "UNAUTHORIZED",
            false,
            Some("Only the owner of a video may modify it"),
            false,
            LogLevel::Debug,
        ),
        AppError::InvalidMedia { .. } => (
            422,
            "INVALID_MEDIA",
            false,
            Some("Check that the file is a valid video"),
            false,
            LogLevel::Warn,
        ),
        AppError::MediaProcessing { .. } => (
            500,
            "MEDIA_PROCESSING_ERROR",
            true,
            Some("Retry the whole upload; contact support if this error persists"),
            true,
            LogLevel::Error,
        ),
        AppError::Internal(_) | AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Database(_) => "Database",
            AppError::Storage(_) => "Storage",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::NotFound(_) => "NotFound",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::UnsupportedMediaType(_) => "UnsupportedMediaType",
            AppError::Unauthenticated(_) => "Unauthenticated",
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::InvalidMedia { kind, .. } => kind,
            AppError::MediaProcessing { kind, .. } => kind,
            AppError::MediaStorage { kind, .. } => kind,
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Database(_) => "Failed to access database".to_string(),
            AppError::Storage(_) | AppError::MediaStorage { .. } => {
                "Failed to access storage".to_string()
            }
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::PayloadTooLarge(ref msg) => msg.clone(),
            AppError::UnsupportedMediaType(ref msg) => msg.clone(),
            AppError::Unauthenticated(ref msg) => msg.clone(),
            AppError::Unauthorized(ref msg) => msg.clone(),
            AppError::InvalidMedia { ref message, .. } => message.clone(),
            AppError::MediaProcessing { .. } => "Failed to process video".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_database() {
        #[cfg(feature = "sqlx")]
        let err = AppError::from(sqlx::Error::PoolClosed);
        #[cfg(not(feature = "sqlx"))]
        let err = AppError::Database("pool closed".to_string());
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_code(), "DATABASE_ERROR");
        assert!(err.is_recoverable());
        assert_eq!(err.client_message(), "Failed to access database");
        assert!(err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_auth_errors_are_distinct() {
        let unauthenticated = AppError::Unauthenticated("Missing bearer token".to_string());
        assert_eq!(unauthenticated.http_status_code(), 401);
        assert_eq!(unauthenticated.error_code(), "UNAUTHENTICATED");

        let unauthorized = AppError::Unauthorized("Not the owner".to_string());
        assert_eq!(unauthorized.http_status_code(), 403);
        assert_eq!(unauthorized.error_code(), "UNAUTHORIZED");
        assert_eq!(unauthorized.client_message(), "Not the owner");
    }

    #[test]
    fn test_media_errors_keep_kind() {
        let err = AppError::MediaProcessing {
            kind: "TranscodeFailed",
            message: "ffmpeg exited with status 1".to_string(),
        };
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_type(), "TranscodeFailed");
        assert_eq!(err.client_message(), "Failed to process video");
        assert!(err.is_sensitive());
        assert!(err.to_string().contains("status 1"));

        let err = AppError::InvalidMedia {
            kind: "InvalidGeometry",
            message: "Video height must be positive".to_string(),
        };
        assert_eq!(err.http_status_code(), 422);
        assert_eq!(err.error_type(), "InvalidGeometry");
        assert!(!err.is_sensitive());
    }

    #[test]
    fn test_media_storage_errors_keep_kind() {
        let err = AppError::MediaStorage {
            kind: "SigningFailed",
            message: "Unknown namespace 'archive'".to_string(),
        };
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_code(), "STORAGE_ERROR");
        assert_eq!(err.error_type(), "SigningFailed");
        assert_eq!(err.client_message(), "Failed to access storage");
        assert!(err.is_sensitive());
    }

    #[test]
    fn test_upload_rejections() {
        let err = AppError::UnsupportedMediaType("must be video/mp4".to_string());
        assert_eq!(err.http_status_code(), 415);
        assert!(!err.is_recoverable());

        let err = AppError::PayloadTooLarge("limit 1 GiB".to_string());
        assert_eq!(err.http_status_code(), 413);
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_detailed_message_includes_source_chain() {
        let err = AppError::from(anyhow::anyhow!("root cause").context("outer"));
        let details = err.detailed_message();
        assert!(details.starts_with("Internal error with source"));
        assert!(details.contains("outer"));
    }
}
