//! Storage abstraction trait
//!
//! This module defines the Storage trait that all blob store backends implement.

use crate::StorageBackend;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Signing failed: {0}")]
    SigningFailed(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Blob store client
///
/// Implementations must be safe to share between concurrent uploads; none of
/// them serialize callers internally.
///
/// **Key format:** keys are produced by the processing pipeline as
/// `{orientation}/{identifier}{extension}`. They never contain `..` or a
/// leading `/`.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Identifier of the bucket (or local namespace) objects are written to.
    /// Persisted alongside the key so a reference can be signed later.
    fn namespace(&self) -> &str;

    /// Upload the full contents of a local file under `key`, tagged with `content_type`.
    async fn put_file(&self, key: &str, path: &Path, content_type: &str) -> StorageResult<()>;

    /// Mint a read-only URL for `key` in `namespace` that expires after `ttl`.
    async fn presigned_get_url(
        &self,
        namespace: &str,
        key: &str,
        ttl: Duration,
    ) -> StorageResult<String>;

    /// Delete an object. Deleting a missing object is not an error.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Check if an object exists
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
