//! Request-scoped temporary files.

use std::path::{Path, PathBuf};

/// Tracks temporary files created while processing one upload.
///
/// Files are removed newest first by [`ScratchFiles::cleanup`]. If the guard
/// is dropped without running cleanup (panic, cancelled request) the same
/// removal happens synchronously in `Drop`. Removal failures are logged and
/// never returned; missing files are ignored.
#[derive(Debug, Default)]
pub struct ScratchFiles {
    paths: Vec<PathBuf>,
}

impl ScratchFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a path for removal. Registering before the file exists is
    /// fine and is how outputs of tools that may fail are tracked.
    pub fn register(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        if !self.paths.contains(&path) {
            self.paths.push(path);
        }
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub async fn cleanup(mut self) {
        for path in std::mem::take(&mut self.paths).into_iter().rev() {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => tracing::debug!(path = %path.display(), "Removed temporary file"),
                Err(e) => log_removal_error(&path, &e),
            }
        }
    }
}

fn log_removal_error(path: &Path, err: &std::io::Error) {
    if err.kind() != std::io::ErrorKind::NotFound {
        tracing::warn!(
            path = %path.display(),
            error = %err,
            "Failed to remove temporary file"
        );
    }
}

impl Drop for ScratchFiles {
    fn drop(&mut self) {
        for path in self.paths.drain(..).rev() {
            if let Err(e) = std::fs::remove_file(&path) {
                log_removal_error(&path, &e);
            }
        }
    }
}
