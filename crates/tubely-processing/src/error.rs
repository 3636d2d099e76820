//! Failure kinds of the upload pipeline and URL signing.

use thiserror::Error;
use tubely_core::AppError;
use tubely_storage::StorageError;

#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("Unsupported media type '{0}': expected video/mp4")]
    UnsupportedMediaType(String),

    #[error("Upload exceeds the limit of {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("Failed to stage upload: {0}")]
    StagingFailed(#[source] std::io::Error),

    #[error("Failed to read upload body: {0}")]
    BodyRead(String),

    #[error("Media probe unavailable: {0}")]
    ProbeUnavailable(String),

    #[error("Failed to parse probe output: {0}")]
    ProbeParseError(String),

    #[error("Invalid stream geometry {width}x{height}")]
    InvalidGeometry { width: u32, height: u32 },

    #[error("Fast-start remux failed ({status}): {stderr}")]
    TranscodeFailed { status: String, stderr: String },

    #[error("Failed to upload to blob store: {0}")]
    StoreUploadFailed(#[source] StorageError),

    #[error("Failed to sign URL: {0}")]
    SigningFailed(#[source] StorageError),
}

impl ProcessingError {
    /// Stable name of the failure kind, reported to clients as `error_type`.
    pub fn kind(&self) -> &'static str {
        match self {
            ProcessingError::UnsupportedMediaType(_) => "UnsupportedMediaType",
            ProcessingError::PayloadTooLarge { .. } => "PayloadTooLarge",
            ProcessingError::StagingFailed(_) => "StagingFailed",
            ProcessingError::BodyRead(_) => "BodyRead",
            ProcessingError::ProbeUnavailable(_) => "ProbeUnavailable",
            ProcessingError::ProbeParseError(_) => "ProbeParseError",
            ProcessingError::InvalidGeometry { .. } => "InvalidGeometry",
            ProcessingError::TranscodeFailed { .. } => "TranscodeFailed",
            ProcessingError::StoreUploadFailed(_) => "StoreUploadFailed",
            ProcessingError::SigningFailed(_) => "SigningFailed",
        }
    }
}

impl From<ProcessingError> for AppError {
    fn from(err: ProcessingError) -> Self {
        let kind = err.kind();
        match err {
            ProcessingError::UnsupportedMediaType(_) => {
                AppError::UnsupportedMediaType(err.to_string())
            }
            ProcessingError::PayloadTooLarge { .. } => AppError::PayloadTooLarge(err.to_string()),
            ProcessingError::BodyRead(_) => AppError::InvalidInput(err.to_string()),
            ProcessingError::InvalidGeometry { .. } | ProcessingError::ProbeParseError(_) => {
                AppError::InvalidMedia {
                    kind,
                    message: err.to_string(),
                }
            }
            ProcessingError::StoreUploadFailed(_) | ProcessingError::SigningFailed(_) => {
                AppError::MediaStorage {
                    kind,
                    message: err.to_string(),
                }
            }
            ProcessingError::StagingFailed(_)
            | ProcessingError::ProbeUnavailable(_)
            | ProcessingError::TranscodeFailed { .. } => AppError::MediaProcessing {
                kind,
                message: err.to_string(),
            },
        }
    }
}
