//! Bounded execution of external media tools.

use std::ffi::OsStr;
use std::process::{Output, Stdio};
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("failed to run {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} timed out after {timeout:?}")]
    Timeout { program: String, timeout: Duration },
}

/// Run `program` to completion and capture its output.
///
/// The child gets a null stdin and is killed if `timeout` expires or the
/// calling future is dropped. A non-zero exit is not an error here; callers
/// inspect `Output::status`.
pub async fn run_tool<I, S>(program: &str, args: I, timeout: Duration) -> Result<Output, CommandError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| CommandError::Io {
            program: program.to_string(),
            source,
        })?;

    match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(result) => result.map_err(|source| CommandError::Io {
            program: program.to_string(),
            source,
        }),
        Err(_) => {
            tracing::warn!(
                program = %program,
                timeout_secs = timeout.as_secs(),
                "External tool timed out, killing process"
            );
            Err(CommandError::Timeout {
                program: program.to_string(),
                timeout,
            })
        }
    }
}

/// Write an executable that ignores its arguments and hangs, standing in for
/// a stuck media tool.
#[cfg(all(test, unix))]
pub(crate) fn write_hanging_tool(dir: &std::path::Path) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("hanging-tool");
    std::fs::write(&path, "#!/bin/sh\nexec sleep 10\n").unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}
