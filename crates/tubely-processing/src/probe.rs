//! Stream geometry extraction with ffprobe.

use async_trait::async_trait;
use serde::Deserialize;
use std::ffi::OsStr;
use std::path::Path;
use std::time::Duration;

use crate::aspect::StreamGeometry;
use crate::command::run_tool;
use crate::error::ProcessingError;

/// Reads the geometry of a fully written local media file.
#[async_trait]
pub trait MediaProbe: Send + Sync {
    async fn probe(&self, path: &Path) -> Result<StreamGeometry, ProcessingError>;
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    width: Option<u32>,
    height: Option<u32>,
}

/// Parse `ffprobe -print_format json -show_streams` output, taking the first
/// reported stream.
pub fn parse_geometry(stdout: &[u8]) -> Result<StreamGeometry, ProcessingError> {
    let output: FfprobeOutput = serde_json::from_slice(stdout)
        .map_err(|e| ProcessingError::ProbeParseError(e.to_string()))?;

    let stream = output
        .streams
        .into_iter()
        .next()
        .ok_or_else(|| ProcessingError::ProbeParseError("no streams reported".to_string()))?;

    match (stream.width, stream.height) {
        (Some(width), Some(height)) => Ok(StreamGeometry::new(width, height)),
        _ => Err(ProcessingError::ProbeParseError(
            "first stream has no width/height".to_string(),
        )),
    }
}

pub struct FfprobeProbe {
    ffprobe_path: String,
    timeout: Duration,
}

impl FfprobeProbe {
    pub fn new(ffprobe_path: impl Into<String>, timeout: Duration) -> Self {
        Self {
            ffprobe_path: ffprobe_path.into(),
            timeout,
        }
    }
}

#[async_trait]
impl MediaProbe for FfprobeProbe {
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffprobe",
        process.executable.path = %self.ffprobe_path,
        ffmpeg.operation = "probe"
    ))]
    async fn probe(&self, path: &Path) -> Result<StreamGeometry, ProcessingError> {
        let start = std::time::Instant::now();

        let output = run_tool(
            &self.ffprobe_path,
            [
                OsStr::new("-v"),
                OsStr::new("error"),
                OsStr::new("-print_format"),
                OsStr::new("json"),
                OsStr::new("-show_streams"),
                OsStr::new("-select_streams"),
                OsStr::new("v:0"),
                path.as_os_str(),
            ],
            self.timeout,
        )
        .await
        .map_err(|e| ProcessingError::ProbeUnavailable(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::error!(status = %output.status, stderr = %stderr, "ffprobe failed");
            return Err(ProcessingError::ProbeUnavailable(format!(
                "ffprobe exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let geometry = parse_geometry(&output.stdout)?;

        tracing::info!(
            duration_ms = start.elapsed().as_millis(),
            width = geometry.width,
            height = geometry.height,
            "Video probe completed"
        );

        Ok(geometry)
    }
}
