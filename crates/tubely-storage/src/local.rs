use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::fs;

type HmacSha256 = Hmac<Sha256>;

/// Local filesystem storage implementation
///
/// Objects live under `base_path`. Read URLs point at `base_url` and carry an
/// expiry timestamp plus an HMAC-SHA256 signature over `{key}:{expires}`,
/// checked by [`LocalStorage::verify_signed_url`] before a file is served.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
    namespace: String,
    signing_key: Vec<u8>,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for file storage (e.g., "/var/lib/tubely/assets")
    /// * `base_url` - Base URL the files are served from (e.g., "http://localhost:8091/media")
    /// * `namespace` - Identifier persisted with every stored reference
    /// * `signing_key` - HMAC key for read URLs
    pub async fn new(
        base_path: impl Into<PathBuf>,
        base_url: String,
        namespace: String,
        signing_key: impl Into<Vec<u8>>,
    ) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
            namespace,
            signing_key: signing_key.into(),
        })
    }

    /// Convert storage key to filesystem path with security validation
    pub fn key_to_path(&self, key: &str) -> StorageResult<PathBuf> {
        if key.is_empty() {
            return Err(StorageError::InvalidKey("Storage key is empty".to_string()));
        }
        if key.starts_with('/') || key.contains('\\') {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }
        if key.split('/').any(|segment| segment == ".." || segment == ".") {
            return Err(StorageError::InvalidKey(
                "Storage key resolves outside storage directory".to_string(),
            ));
        }

        Ok(self.base_path.join(key))
    }

    fn signature(&self, key: &str, expires: u64) -> StorageResult<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(&self.signing_key)
            .map_err(|e| StorageError::SigningFailed(e.to_string()))?;
        mac.update(key.as_bytes());
        mac.update(b":");
        mac.update(expires.to_string().as_bytes());
        Ok(mac)
    }

    /// Check a signature produced by `presigned_get_url`. Expired or tampered
    /// URLs are rejected.
    pub fn verify_signed_url(&self, key: &str, expires: u64, signature: &str) -> bool {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        if now > expires {
            return false;
        }

        let Ok(tag) = hex::decode(signature) else {
            return false;
        };
        match self.signature(key, expires) {
            Ok(mac) => mac.verify_slice(&tag).is_ok(),
            Err(_) => false,
        }
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for LocalStorage {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    async fn put_file(&self, key: &str, path: &Path, content_type: &str) -> StorageResult<()> {
        let dest = self.key_to_path(key)?;
        self.ensure_parent_dir(&dest).await?;

        let start = std::time::Instant::now();

        let size = fs::copy(path, &dest).await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to copy {} to {}: {}",
                path.display(),
                dest.display(),
                e
            ))
        })?;

        tracing::info!(
            path = %dest.display(),
            key = %key,
            content_type = %content_type,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(())
    }

    async fn presigned_get_url(
        &self,
        namespace: &str,
        key: &str,
        ttl: Duration,
    ) -> StorageResult<String> {
        if namespace != self.namespace {
            return Err(StorageError::SigningFailed(format!(
                "Unknown namespace '{}'",
                namespace
            )));
        }
        self.key_to_path(key)?;

        let expires = SystemTime::now()
            .checked_add(ttl)
            .ok_or_else(|| {
                StorageError::SigningFailed(format!("URL lifetime {:?} is out of range", ttl))
            })?
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let tag = self.signature(key, expires)?.finalize().into_bytes();

        Ok(format!(
            "{}/{}?expires={}&signature={}",
            self.base_url.trim_end_matches('/'),
            key,
            expires,
            hex::encode(tag)
        ))
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.key_to_path(key)?;

        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(key = %key, "Local storage delete successful");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::DeleteFailed(format!(
                "Failed to delete {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(key)?;
        Ok(fs::try_exists(&path).await?)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SECRET: &[u8] = b"local-signing-secret-for-tests!!";

    async fn storage(dir: &Path) -> LocalStorage {
        LocalStorage::new(
            dir.join("assets"),
            "http://localhost:8091/media/".to_string(),
            "local".to_string(),
            SECRET,
        )
        .await
        .unwrap()
    }

    fn query_param<'a>(url: &'a str, name: &str) -> &'a str {
        let query = url.split_once('?').unwrap().1;
        query
            .split('&')
            .find_map(|pair| pair.strip_prefix(&format!("{}=", name)))
            .unwrap()
    }

    #[tokio::test]
    async fn test_presign_rejects_out_of_range_ttl() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let result = storage
            .presigned_get_url("local", "landscape/abc.mp4", Duration::from_secs(u64::MAX))
            .await;

        assert!(matches!(result, Err(StorageError::SigningFailed(_))));
    }

    #[tokio::test]
    async fn test_put_file_copies_content() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;
        let source = dir.path().join("input.mp4");
        fs::write(&source, b"moov-first").await.unwrap();

        storage
            .put_file("landscape/abc.mp4", &source, "video/mp4")
            .await
            .unwrap();

        assert!(storage.exists("landscape/abc.mp4").await.unwrap());
        let stored = fs::read(dir.path().join("assets/landscape/abc.mp4"))
            .await
            .unwrap();
        assert_eq!(stored, b"moov-first");
        // source is left in place for the caller to clean up
        assert!(source.exists());
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let result = storage.delete("../../../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.exists("/etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.exists("other/./x.mp4").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_delete_nonexistent_is_ok() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;
        assert!(storage.delete("portrait/missing.mp4").await.is_ok());
    }

    #[tokio::test]
    async fn test_signed_url_roundtrip() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let url = storage
            .presigned_get_url("local", "landscape/abc.mp4", Duration::from_secs(900))
            .await
            .unwrap();
        assert!(url.starts_with("http://localhost:8091/media/landscape/abc.mp4?expires="));

        let expires: u64 = query_param(&url, "expires").parse().unwrap();
        let signature = query_param(&url, "signature");
        let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs();
        assert!(expires >= now + 899 && expires <= now + 901);

        assert!(storage.verify_signed_url("landscape/abc.mp4", expires, signature));
        assert!(!storage.verify_signed_url("landscape/other.mp4", expires, signature));
        assert!(!storage.verify_signed_url("landscape/abc.mp4", expires + 1, signature));
        assert!(!storage.verify_signed_url("landscape/abc.mp4", expires, "not-hex"));
    }

    #[tokio::test]
    async fn test_expired_signature_rejected() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let expired = 1_000;
        let tag = storage
            .signature("other/x.mp4", expired)
            .unwrap()
            .finalize()
            .into_bytes();
        assert!(!storage.verify_signed_url("other/x.mp4", expired, &hex::encode(tag)));
    }

    #[tokio::test]
    async fn test_foreign_namespace_cannot_be_signed() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let result = storage
            .presigned_get_url("some-bucket", "landscape/abc.mp4", Duration::from_secs(60))
            .await;
        assert!(matches!(result, Err(StorageError::SigningFailed(_))));
    }
}
