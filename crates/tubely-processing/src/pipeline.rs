//! Upload pipeline: stage → remux → classify → key → store.
//!
//! One call handles one upload end to end and shares nothing with other calls
//! except the blob store client. Every temporary file it creates is removed
//! before it returns, whichever stage failed.

use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;

use tubely_core::constants::ACCEPTED_VIDEO_CONTENT_TYPE;
use tubely_core::StoredVideoReference;
use tubely_storage::{Storage, StorageError};

use crate::aspect::Orientation;
use crate::error::ProcessingError;
use crate::keys::KeyDeriver;
use crate::probe::MediaProbe;
use crate::scratch::ScratchFiles;
use crate::transcode::{faststart_output_path, FastStartTranscoder};

const STAGED_PREFIX: &str = "tubely-upload-";
const STAGED_SUFFIX: &str = ".mp4";

/// Media type of a `Content-Type` header value, without parameters,
/// lowercased.
pub fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

pub struct UploadPipeline {
    storage: Arc<dyn Storage>,
    probe: Arc<dyn MediaProbe>,
    transcoder: Arc<dyn FastStartTranscoder>,
    keys: KeyDeriver,
    work_dir: PathBuf,
}

impl UploadPipeline {
    pub fn new(
        storage: Arc<dyn Storage>,
        probe: Arc<dyn MediaProbe>,
        transcoder: Arc<dyn FastStartTranscoder>,
        keys: KeyDeriver,
        work_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            storage,
            probe,
            transcoder,
            keys,
            work_dir: work_dir.into(),
        }
    }

    pub fn work_dir(&self) -> &std::path::Path {
        &self.work_dir
    }

    /// Process one uploaded video and return the reference to persist.
    ///
    /// The content type is checked before anything touches disk. The body is
    /// written as it arrives and rejected as soon as it would exceed
    /// `size_limit`. At most one blob store write happens per call.
    #[tracing::instrument(skip(self, stream))]
    pub async fn process_upload<S, E>(
        &self,
        stream: S,
        content_type: &str,
        size_limit: usize,
    ) -> Result<StoredVideoReference, ProcessingError>
    where
        S: Stream<Item = Result<Bytes, E>> + Send,
        E: std::fmt::Display,
    {
        let media_type = media_type(content_type);
        if media_type != ACCEPTED_VIDEO_CONTENT_TYPE {
            return Err(ProcessingError::UnsupportedMediaType(content_type.to_string()));
        }

        let start = std::time::Instant::now();
        let mut scratch = ScratchFiles::new();
        let result = self
            .run_stages(stream, &media_type, size_limit, &mut scratch)
            .await;
        scratch.cleanup().await;

        match &result {
            Ok(reference) => tracing::info!(
                namespace = %reference.namespace(),
                key = %reference.key(),
                duration_ms = start.elapsed().as_millis(),
                "Video upload processed"
            ),
            Err(e) => tracing::warn!(
                error = %e,
                kind = e.kind(),
                duration_ms = start.elapsed().as_millis(),
                "Video upload failed"
            ),
        }

        result
    }

    async fn run_stages<S, E>(
        &self,
        stream: S,
        media_type: &str,
        size_limit: usize,
        scratch: &mut ScratchFiles,
    ) -> Result<StoredVideoReference, ProcessingError>
    where
        S: Stream<Item = Result<Bytes, E>> + Send,
        E: std::fmt::Display,
    {
        let staged = self.stage(stream, size_limit, scratch).await?;

        scratch.register(faststart_output_path(&staged));
        let processed = self.transcoder.remux(&staged).await?;
        scratch.register(&processed);

        let geometry = self.probe.probe(&processed).await?;
        let orientation = Orientation::classify(geometry)?;
        tracing::debug!(
            width = geometry.width,
            height = geometry.height,
            orientation = ?orientation,
            "Classified video"
        );

        let key = self.keys.derive(media_type, orientation);
        let reference = StoredVideoReference::new(self.storage.namespace(), key.as_str())
            .ok_or_else(|| {
                ProcessingError::StoreUploadFailed(StorageError::InvalidKey(format!(
                    "cannot reference '{}' in namespace '{}'",
                    key,
                    self.storage.namespace()
                )))
            })?;

        self.storage
            .put_file(&key, &processed, media_type)
            .await
            .map_err(ProcessingError::StoreUploadFailed)?;

        Ok(reference)
    }

    /// Write the body to a fresh temporary file in `work_dir`.
    async fn stage<S, E>(
        &self,
        stream: S,
        size_limit: usize,
        scratch: &mut ScratchFiles,
    ) -> Result<PathBuf, ProcessingError>
    where
        S: Stream<Item = Result<Bytes, E>> + Send,
        E: std::fmt::Display,
    {
        let (file, path) = tempfile::Builder::new()
            .prefix(STAGED_PREFIX)
            .suffix(STAGED_SUFFIX)
            .tempfile_in(&self.work_dir)
            .map_err(ProcessingError::StagingFailed)?
            .keep()
            .map_err(|e| ProcessingError::StagingFailed(e.error))?;
        scratch.register(&path);

        let mut file = tokio::fs::File::from_std(file);
        let mut stream = std::pin::pin!(stream);
        let mut written: usize = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| ProcessingError::BodyRead(e.to_string()))?;
            if written.saturating_add(chunk.len()) > size_limit {
                return Err(ProcessingError::PayloadTooLarge { limit: size_limit });
            }
            file.write_all(&chunk)
                .await
                .map_err(ProcessingError::StagingFailed)?;
            written += chunk.len();
        }

        file.flush().await.map_err(ProcessingError::StagingFailed)?;
        drop(file);

        tracing::debug!(path = %path.display(), size_bytes = written, "Staged upload");
        Ok(path)
    }
}
