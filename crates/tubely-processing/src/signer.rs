use std::sync::Arc;
use std::time::Duration;

use tubely_core::{StoredVideoReference, Video, VideoResponse};
use tubely_storage::Storage;

use crate::error::ProcessingError;

/// Turns stored references into time-limited read URLs.
///
/// Nothing is persisted; URLs are minted again on every read.
#[derive(Clone)]
pub struct UrlSigner {
    storage: Arc<dyn Storage>,
    ttl: Duration,
}

impl UrlSigner {
    pub fn new(storage: Arc<dyn Storage>, ttl: Duration) -> Self {
        Self { storage, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign a stored `video_url` value.
    ///
    /// Absent values stay absent. Values that are not a `{namespace},{key}`
    /// reference are returned unchanged, as they are already final URLs.
    pub async fn sign(
        &self,
        stored: Option<&str>,
        ttl: Duration,
    ) -> Result<Option<String>, ProcessingError> {
        let Some(raw) = stored else {
            return Ok(None);
        };
        let Some(reference) = StoredVideoReference::decode(raw) else {
            return Ok(Some(raw.to_string()));
        };

        let url = self
            .storage
            .presigned_get_url(reference.namespace(), reference.key(), ttl)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    namespace = %reference.namespace(),
                    key = %reference.key(),
                    "Failed to sign video URL"
                );
                ProcessingError::SigningFailed(e)
            })?;

        Ok(Some(url))
    }

    /// Presentation form of a record, with `video_url` signed for the default ttl.
    pub async fn sign_video(&self, video: Video) -> Result<VideoResponse, ProcessingError> {
        let signed = self.sign(video.video_url.as_deref(), self.ttl).await?;
        let mut response = VideoResponse::from(video);
        response.video_url = signed;
        Ok(response)
    }
}
