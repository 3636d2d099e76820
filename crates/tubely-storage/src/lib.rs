//! Tubely Storage Library
//!
//! Blob store abstraction for processed videos: the [`Storage`] trait plus S3
//! (via `object_store`) and local filesystem backends.
//!
//! # Storage key format
//!
//! Keys are `{orientation}/{identifier}{extension}`, for example
//! `landscape/3q2-7wEAAA….mp4`. Keys must not contain `..` or a leading `/`.
//! The namespace (bucket name, or the configured local namespace) is stored
//! next to the key so URLs can be minted later without knowing the backend.

pub mod factory;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use factory::create_local_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
pub use tubely_core::StorageBackend;
