// src/system/coordinator.rs

//! Waiting for a launched process and validating its exit code.

use crate::{
    models::{FinishedProcess, OutputResult, WaitOptions},
    system::{
        capture::{CaptureError, StreamCapture},
        launcher::RunningProcess,
    },
};
use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Errors raised while waiting for a process to finish.
#[derive(Error, Debug)]
pub enum WaitError {
    /// The process exited with a code other than the one required.
    #[error("Process '{}' exited with code {observed}, expected {expected}.", .program.display())]
    ExitCodeMismatch {
        /// The program that was run.
        program: PathBuf,
        /// The exit code the process returned.
        observed: i32,
        /// The exit code that was required.
        expected: i32,
    },
    /// Waiting on the OS process failed.
    #[error("Failed to wait for process '{}': {source}", .program.display())]
    Wait {
        /// The program that was run.
        program: PathBuf,
        /// The underlying OS error.
        #[source]
        source: std::io::Error,
    },
    /// Draining a captured stream failed.
    #[error(transparent)]
    Capture(#[from] CaptureError),
}

impl RunningProcess {
    /// Waits for the process and its captures to finish. See [`wait`].
    pub async fn wait(self, options: &WaitOptions) -> Result<FinishedProcess, WaitError> {
        wait(self, options).await
    }
}

/// Suspends until the process has exited and every capture drain has completed.
///
/// The exit wait and the drains are joined, never raced: exit does not imply that a drain
/// has already seen EOF. Streams that were not captured come back as
/// [`OutputResult::Ignored`].
///
/// # Errors
/// Returns [`WaitError::ExitCodeMismatch`] when `options` requires an exit code and the
/// process returned another one; the finished process is discarded in that case.
pub async fn wait(process: RunningProcess, options: &WaitOptions) -> Result<FinishedProcess, WaitError> {
    let RunningProcess {
        mut child,
        program,
        stdout,
        stderr,
        ..
    } = process;

    // 1. Join the exit wait with both drains; none of them may starve another.
    let (status, output, error_output) =
        tokio::join!(child.wait(), join_capture(stdout), join_capture(stderr));

    // 2. Surface OS and drain failures before looking at the exit code.
    let status = status.map_err(|source| WaitError::Wait {
        program: program.clone(),
        source,
    })?;
    let output = output?;
    let error_output = error_output?;
    let exit_code = exit_code_of(status);

    log::debug!("Process '{}' exited with code {}", program.display(), exit_code);

    // 3. Apply the exit code policy; a mismatch discards the captured output.
    if let Some(expected) = options.expected_exit_code {
        if exit_code != expected {
            return Err(WaitError::ExitCodeMismatch {
                program,
                observed: exit_code,
                expected,
            });
        }
    }

    Ok(FinishedProcess {
        exit_code,
        output,
        error_output,
    })
}

async fn join_capture(capture: Option<StreamCapture>) -> Result<OutputResult, CaptureError> {
    match capture {
        Some(capture) => Ok(OutputResult::Captured(capture.finish().await?)),
        None => Ok(OutputResult::Ignored),
    }
}

/// Reduces an exit status to an integer. A Unix child killed by a signal reports
/// `128 + signal`, the shell convention.
fn exit_code_of(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    -1
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::models::{ArgumentVector, OutputMode, StartOptions};
    use crate::system::launcher;
    use std::path::Path;

    fn sh(script: &str, options: &StartOptions) -> RunningProcess {
        launcher::start(
            Path::new("sh"),
            &ArgumentVector::from_args(["-c", script]),
            options,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_output_larger_than_pipe_buffer_does_not_deadlock() {
        // 256 KiB on stdout and 128 KiB on stderr, well past a 64 KiB pipe buffer.
        let script = "head -c 262144 /dev/zero | tr '\\0' 'a'; head -c 131072 /dev/zero | tr '\\0' 'b' >&2";
        let process = sh(script, &StartOptions::capture_all_quiet());

        let finished = process.wait(&WaitOptions::default()).await.unwrap();

        let stdout = finished.output.string_output().unwrap();
        assert_eq!(stdout.len(), 262_144);
        assert!(stdout.bytes().all(|b| b == b'a'));
        let stderr = finished.error_output.string_output().unwrap();
        assert_eq!(stderr.len(), 131_072);
        assert!(stderr.bytes().all(|b| b == b'b'));
    }

    #[tokio::test]
    async fn test_exit_code_mismatch_is_reported() {
        let process = sh("exit 1", &StartOptions::capture_all_quiet());
        let result = wait(process, &WaitOptions::expect(0)).await;
        match result {
            Err(WaitError::ExitCodeMismatch {
                observed, expected, ..
            }) => {
                assert_eq!(observed, 1);
                assert_eq!(expected, 0);
            }
            other => panic!("expected an exit code mismatch, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_accept_any_exit_code() {
        let process = sh("echo partial; exit 1", &StartOptions::capture_all_quiet());
        let finished = wait(process, &WaitOptions::accept_any()).await.unwrap();
        assert_eq!(finished.exit_code, 1);
        assert!(!finished.success());
        assert_eq!(finished.output.string_output().unwrap(), "partial");
        assert_eq!(finished.error_output.string_output().unwrap(), "");
    }

    #[tokio::test]
    async fn test_non_zero_expected_code_matches() {
        let process = sh("exit 3", &StartOptions::capture_all_quiet());
        let finished = wait(process, &WaitOptions::expect(3)).await.unwrap();
        assert_eq!(finished.exit_code, 3);
    }

    #[tokio::test]
    async fn test_uncaptured_streams_are_ignored() {
        let options = StartOptions {
            output: OutputMode::Ignore,
            error_output: OutputMode::Capture,
            suppress_echo: true,
        };
        let process = sh("echo to-stderr >&2", &options);
        let finished = wait(process, &WaitOptions::default()).await.unwrap();
        assert_eq!(finished.output, OutputResult::Ignored);
        assert!(finished.output.string_output().is_err());
        assert_eq!(finished.error_output.string_output().unwrap(), "to-stderr");
    }

    #[tokio::test]
    async fn test_signal_termination_maps_to_shell_code() {
        let process = sh("kill -9 $$", &StartOptions::capture_all_quiet());
        let finished = wait(process, &WaitOptions::accept_any()).await.unwrap();
        assert_eq!(finished.exit_code, 128 + 9);
    }
}
