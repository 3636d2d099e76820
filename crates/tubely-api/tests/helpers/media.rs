use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tubely_processing::{
    faststart_output_path, FastStartTranscoder, MediaProbe, ProcessingError, StreamGeometry,
};

/// Prefix the fake transcoder puts in front of the uploaded bytes.
pub const REMUX_MARKER: &[u8] = b"faststart:";

pub struct FixedProbe(pub StreamGeometry);

#[async_trait]
impl MediaProbe for FixedProbe {
    async fn probe(&self, _path: &Path) -> Result<StreamGeometry, ProcessingError> {
        Ok(self.0)
    }
}

pub struct CopyingTranscoder;

#[async_trait]
impl FastStartTranscoder for CopyingTranscoder {
    async fn remux(&self, input: &Path) -> Result<PathBuf, ProcessingError> {
        let output = faststart_output_path(input);
        let mut data = REMUX_MARKER.to_vec();
        data.extend(
            tokio::fs::read(input)
                .await
                .map_err(ProcessingError::StagingFailed)?,
        );
        tokio::fs::write(&output, data)
            .await
            .map_err(ProcessingError::StagingFailed)?;
        Ok(output)
    }
}
