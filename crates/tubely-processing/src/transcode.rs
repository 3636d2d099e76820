//! Fast-start remuxing with ffmpeg.
//!
//! The remux copies every stream untouched and moves the `moov` atom to the
//! front of the file so playback can begin before the download finishes.

use async_trait::async_trait;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::command::{run_tool, CommandError};
use crate::error::ProcessingError;

const OUTPUT_SUFFIX: &str = ".processing";

/// Sibling path the remuxed file is written to: `{input}.processing`.
pub fn faststart_output_path(input: &Path) -> PathBuf {
    let mut name = OsString::from(input.as_os_str());
    name.push(OUTPUT_SUFFIX);
    PathBuf::from(name)
}

/// Rewrites a container for progressive playback.
///
/// Implementations write to [`faststart_output_path`] and never touch the
/// input. On failure the output may be missing or partial.
#[async_trait]
pub trait FastStartTranscoder: Send + Sync {
    async fn remux(&self, input: &Path) -> Result<PathBuf, ProcessingError>;
}

pub struct FfmpegFastStart {
    ffmpeg_path: String,
    timeout: Duration,
}

impl FfmpegFastStart {
    pub fn new(ffmpeg_path: impl Into<String>, timeout: Duration) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            timeout,
        }
    }
}

#[async_trait]
impl FastStartTranscoder for FfmpegFastStart {
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffmpeg",
        process.executable.path = %self.ffmpeg_path,
        ffmpeg.operation = "faststart"
    ))]
    async fn remux(&self, input: &Path) -> Result<PathBuf, ProcessingError> {
        let start = std::time::Instant::now();
        let output_path = faststart_output_path(input);

        let output = run_tool(
            &self.ffmpeg_path,
            [
                OsStr::new("-nostdin"),
                OsStr::new("-y"),
                OsStr::new("-v"),
                OsStr::new("error"),
                OsStr::new("-i"),
                input.as_os_str(),
                OsStr::new("-c"),
                OsStr::new("copy"),
                OsStr::new("-movflags"),
                OsStr::new("faststart"),
                OsStr::new("-f"),
                OsStr::new("mp4"),
                output_path.as_os_str(),
            ],
            self.timeout,
        )
        .await
        .map_err(|e| match e {
            CommandError::Timeout { timeout, .. } => ProcessingError::TranscodeFailed {
                status: format!("timed out after {:?}", timeout),
                stderr: String::new(),
            },
            CommandError::Io { source, .. } => ProcessingError::TranscodeFailed {
                status: "failed to start".to_string(),
                stderr: source.to_string(),
            },
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            tracing::error!(status = %output.status, stderr = %stderr, "ffmpeg fast-start remux failed");
            return Err(ProcessingError::TranscodeFailed {
                status: output.status.to_string(),
                stderr,
            });
        }

        tracing::info!(
            duration_ms = start.elapsed().as_millis(),
            output = %output_path.display(),
            "Fast-start remux completed"
        );

        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_is_sibling() {
        let input = Path::new("/tmp/tubely-upload-abc.mp4");
        let output = faststart_output_path(input);
        assert_eq!(output, PathBuf::from("/tmp/tubely-upload-abc.mp4.processing"));
        assert_eq!(output.parent(), input.parent());
        assert_ne!(output, input);
    }

    #[tokio::test]
    async fn test_missing_binary_is_transcode_failure() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.mp4");
        tokio::fs::write(&input, b"data").await.unwrap();

        let transcoder = FfmpegFastStart::new("/nonexistent/ffmpeg", Duration::from_secs(1));
        let result = transcoder.remux(&input).await;

        assert!(matches!(
            result,
            Err(ProcessingError::TranscodeFailed { .. })
        ));
        assert_eq!(tokio::fs::read(&input).await.unwrap(), b"data");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout_is_transcode_failure() {
        let dir = tempfile::tempdir().unwrap();
        let tool = crate::command::write_hanging_tool(dir.path());
        let input = dir.path().join("in.mp4");
        tokio::fs::write(&input, b"original bytes").await.unwrap();

        let start = std::time::Instant::now();
        let transcoder =
            FfmpegFastStart::new(tool.display().to_string(), Duration::from_millis(100));
        let result = transcoder.remux(&input).await;

        match result {
            Err(ProcessingError::TranscodeFailed { status, .. }) => {
                assert!(status.starts_with("timed out"), "status: {}", status)
            }
            other => panic!("expected TranscodeFailed, got {:?}", other),
        }
        assert!(start.elapsed() < Duration::from_secs(5));
        assert_eq!(tokio::fs::read(&input).await.unwrap(), b"original bytes");
    }
}
