use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use http::Method;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::signer::Signer;
use object_store::Error as ObjectStoreError;
use object_store::{
    Attribute, AttributeValue, Attributes, ObjectStore, ObjectStoreExt, PutMultipartOptions,
    PutOptions, PutPayload, Result as ObjectResult, WriteMultipart,
};
use std::time::Duration;
use tokio::io::AsyncReadExt;

/// Files larger than one part go up as a multipart upload.
const UPLOAD_PART_SIZE: usize = 8 * 1024 * 1024;
const UPLOAD_CONCURRENCY: usize = 4;
const READ_BUFFER_SIZE: usize = 64 * 1024;

/// S3 storage implementation
#[derive(Clone)]
pub struct S3Storage {
    store: AmazonS3,
    /// Kept so references written to another bucket can still be signed.
    builder: AmazonS3Builder,
    bucket: String,
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    pub async fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        let mut builder = AmazonS3Builder::from_env().with_region(region);

        if let Some(ref endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .clone()
            .with_bucket_name(bucket.clone())
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        tracing::info!(bucket = %bucket, endpoint = ?endpoint_url, "S3 storage initialized");

        Ok(S3Storage {
            store,
            builder,
            bucket,
        })
    }

    fn store_for(&self, bucket: &str) -> StorageResult<AmazonS3> {
        if bucket == self.bucket {
            return Ok(self.store.clone());
        }
        self.builder
            .clone()
            .with_bucket_name(bucket)
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))
    }
}

fn upload_error(path: &std::path::Path, e: impl std::fmt::Display) -> StorageError {
    StorageError::UploadFailed(format!("Failed to upload {}: {}", path.display(), e))
}

/// Stream a file into `store` without holding more than a few parts in memory.
///
/// Returns the number of bytes uploaded.
async fn upload_file<S: ObjectStore + ?Sized>(
    store: &S,
    location: &Path,
    path: &std::path::Path,
    attributes: Attributes,
    part_size: usize,
) -> StorageResult<u64> {
    let mut file = tokio::fs::File::open(path)
        .await
        .map_err(|e| upload_error(path, e))?;
    let size = file
        .metadata()
        .await
        .map_err(|e| upload_error(path, e))?
        .len();

    if size <= part_size as u64 {
        let mut data = Vec::with_capacity(size as usize);
        file.read_to_end(&mut data)
            .await
            .map_err(|e| upload_error(path, e))?;
        let opts = PutOptions {
            attributes,
            ..Default::default()
        };
        store
            .put_opts(location, PutPayload::from(Bytes::from(data)), opts)
            .await
            .map_err(|e| upload_error(path, e))?;
        return Ok(size);
    }

    let opts = PutMultipartOptions {
        attributes,
        ..Default::default()
    };
    let upload = store
        .put_multipart_opts(location, opts)
        .await
        .map_err(|e| upload_error(path, e))?;
    let mut writer = WriteMultipart::new_with_chunk_size(upload, part_size);
    let mut buf = vec![0u8; READ_BUFFER_SIZE.min(part_size)];
    let mut sent = 0u64;

    loop {
        let read = match file.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                let _ = writer.abort().await;
                return Err(upload_error(path, e));
            }
        };
        if let Err(e) = writer.wait_for_capacity(UPLOAD_CONCURRENCY).await {
            let _ = writer.abort().await;
            return Err(upload_error(path, e));
        }
        writer.write(&buf[..read]);
        sent += read as u64;
    }

    writer.finish().await.map_err(|e| upload_error(path, e))?;
    Ok(sent)
}

#[async_trait]
impl Storage for S3Storage {
    fn namespace(&self) -> &str {
        &self.bucket
    }

    async fn put_file(
        &self,
        key: &str,
        path: &std::path::Path,
        content_type: &str,
    ) -> StorageResult<()> {
        let location = Path::from(key.to_string());

        let mut attributes = Attributes::new();
        attributes.insert(
            Attribute::ContentType,
            AttributeValue::from(content_type.to_string()),
        );

        let start = std::time::Instant::now();

        let size = upload_file(&self.store, &location, path, attributes, UPLOAD_PART_SIZE)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 upload failed"
                );
                e
            })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            content_type = %content_type,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(())
    }

    async fn presigned_get_url(
        &self,
        namespace: &str,
        key: &str,
        ttl: Duration,
    ) -> StorageResult<String> {
        let store = self.store_for(namespace)?;
        let location = Path::from(key.to_string());

        let url_result: ObjectResult<_> = store.signed_url(Method::GET, &location, ttl).await;

        let url = url_result
            .map_err(|e| StorageError::SigningFailed(e.to_string()))?
            .to_string();

        Ok(url)
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let start = std::time::Instant::now();
        let location = Path::from(key.to_string());

        let result: ObjectResult<_> = self.store.delete(&location).await;

        match result {
            Ok(()) | Err(ObjectStoreError::NotFound { .. }) => {}
            Err(e) => {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 delete failed"
                );
                return Err(StorageError::DeleteFailed(e.to_string()));
            }
        }

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 delete successful"
        );

        Ok(())
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let location = Path::from(key.to_string());
        match self.store.head(&location).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_store::memory::InMemory;

    fn video_attributes() -> Attributes {
        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, AttributeValue::from("video/mp4"));
        attributes
    }

    async fn fetch(store: &InMemory, location: &Path) -> (Bytes, Option<String>) {
        let result = store.get(location).await.unwrap();
        let content_type = result
            .attributes
            .get(&Attribute::ContentType)
            .map(|v| v.to_string());
        (result.bytes().await.unwrap(), content_type)
    }

    #[tokio::test]
    async fn test_upload_file_in_parts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upload.mp4");
        let data: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
        tokio::fs::write(&path, &data).await.unwrap();

        let store = InMemory::new();
        let location = Path::from("landscape/abc.mp4");
        let size = upload_file(&store, &location, &path, video_attributes(), 1024)
            .await
            .unwrap();

        assert_eq!(size, data.len() as u64);
        let (stored, content_type) = fetch(&store, &location).await;
        assert_eq!(stored.as_ref(), data.as_slice());
        assert_eq!(content_type.as_deref(), Some("video/mp4"));
    }

    #[tokio::test]
    async fn test_upload_small_file_single_put() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upload.mp4");
        tokio::fs::write(&path, b"small video").await.unwrap();

        let store = InMemory::new();
        let location = Path::from("portrait/abc.mp4");
        let size = upload_file(&store, &location, &path, video_attributes(), 1024)
            .await
            .unwrap();

        assert_eq!(size, 11);
        let (stored, content_type) = fetch(&store, &location).await;
        assert_eq!(stored.as_ref(), b"small video");
        assert_eq!(content_type.as_deref(), Some("video/mp4"));
    }

    #[tokio::test]
    async fn test_upload_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = InMemory::new();
        let location = Path::from("other/abc.mp4");

        let result = upload_file(
            &store,
            &location,
            &dir.path().join("missing.mp4"),
            video_attributes(),
            1024,
        )
        .await;

        assert!(matches!(result, Err(StorageError::UploadFailed(_))));
        assert!(store.head(&location).await.is_err());
    }
}
