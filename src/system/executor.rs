// src/system/executor.rs

//! Convenience entry points composing launch, capture, wait and resolution.

use crate::{
    models::{
        ArgumentVector, ExecContext, FinishedProcess, OutputMode, OutputNotCaptured,
    },
    system::{
        coordinator::{self, WaitError},
        launcher::{self, LaunchError},
        resolver::{ExecutableResolver, ResolveError},
    },
};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Any failure of a facade call.
#[derive(Error, Debug)]
pub enum ExecutionError {
    /// The process could not be started.
    #[error(transparent)]
    Launch(#[from] LaunchError),
    /// Waiting failed or the exit code did not match.
    #[error(transparent)]
    Wait(#[from] WaitError),
    /// Executable resolution failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    /// Output was read from a stream that was not captured.
    #[error(transparent)]
    OutputNotCaptured(#[from] OutputNotCaptured),
}

impl ExecutionError {
    /// The observed exit code when the failure was an exit-code mismatch.
    pub fn mismatched_exit_code(&self) -> Option<i32> {
        match self {
            Self::Wait(WaitError::ExitCodeMismatch { observed, .. }) => Some(*observed),
            _ => None,
        }
    }

    /// The status a command-line caller should exit with for this failure.
    ///
    /// A mismatch reports the child's own code, except that a child which exited with 0
    /// still failed the check and maps to 1. Every other failure maps to 1.
    pub fn exit_status(&self) -> i32 {
        self.mismatched_exit_code()
            .filter(|code| *code != 0)
            .unwrap_or(1)
    }
}

/// Runs a program to completion using the process-wide default options.
///
/// The defaults are read once, when the call starts; see [`ExecContext::from_defaults`].
pub async fn execute(
    program: impl AsRef<Path>,
    args: &ArgumentVector,
) -> Result<FinishedProcess, ExecutionError> {
    execute_with(program, args, &ExecContext::from_defaults()).await
}

/// Runs a program to completion with an explicit context.
pub async fn execute_with(
    program: impl AsRef<Path>,
    args: &ArgumentVector,
    context: &ExecContext,
) -> Result<FinishedProcess, ExecutionError> {
    let process = launcher::start(program.as_ref(), args, &context.start)?;
    Ok(coordinator::wait(process, &context.wait).await?)
}

/// Runs a program and returns its standard output.
///
/// Standard output is always captured regardless of `context`; the rest of the context
/// (error stream, echo, expected exit code) applies as given.
pub async fn execute_and_capture_output(
    program: impl AsRef<Path>,
    args: &ArgumentVector,
    context: &ExecContext,
) -> Result<String, ExecutionError> {
    let mut context = *context;
    context.start.output = OutputMode::Capture;
    let finished = execute_with(program, args, &context).await?;
    Ok(finished.output.string_output()?.to_string())
}

/// Resolves `name` with the platform search helper, `None` if it is not on the path.
pub async fn try_resolve_executable(name: &str) -> Result<Option<PathBuf>, ExecutionError> {
    Ok(ExecutableResolver::default().try_resolve(name).await?)
}

/// Resolves `name` with the platform search helper, failing if it is not on the path.
pub async fn resolve_executable(name: &str) -> Result<PathBuf, ExecutionError> {
    Ok(ExecutableResolver::default().resolve(name).await?)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::models::{StartOptions, WaitOptions};

    fn quiet_context() -> ExecContext {
        ExecContext::default().with_start(StartOptions {
            suppress_echo: true,
            ..StartOptions::default()
        })
    }

    #[tokio::test]
    async fn test_execute_and_capture_output() {
        let args = ArgumentVector::from_args(["-c", "printf 'a b\\n\"quoted\"\\n\\n'"]);
        let text = execute_and_capture_output("sh", &args, &quiet_context())
            .await
            .unwrap();
        assert_eq!(text, "a b\n\"quoted\"");
    }

    #[tokio::test]
    async fn test_arguments_reach_child_intact() {
        let tricky = ["", "two words", r#"quo"te"#, r"back\slash\", r#"\"mixed\\"#];
        let mut args = vec!["-c".to_string(), r#"for a in "$@"; do printf '[%s]\n' "$a"; done"#.to_string(), "sh".to_string()];
        args.extend(tricky.iter().map(|s| s.to_string()));

        let text = execute_and_capture_output("sh", &ArgumentVector::Arguments(args), &quiet_context())
            .await
            .unwrap();

        let expected: Vec<String> = tricky.iter().map(|s| format!("[{}]", s)).collect();
        assert_eq!(text, expected.join("\n"));
    }

    #[tokio::test]
    async fn test_exit_code_mismatch_is_exposed() {
        let err = execute_with(
            "sh",
            &ArgumentVector::from_args(["-c", "exit 4"]),
            &quiet_context(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.mismatched_exit_code(), Some(4));
        assert_eq!(err.exit_status(), 4);
    }

    #[tokio::test]
    async fn test_unexpected_success_still_fails_with_non_zero_status() {
        let context = quiet_context().with_wait(WaitOptions::expect(1));
        let err = execute_with("sh", &ArgumentVector::from_args(["-c", "exit 0"]), &context)
            .await
            .unwrap_err();
        assert_eq!(err.mismatched_exit_code(), Some(0));
        assert_eq!(err.exit_status(), 1);
    }

    #[test]
    fn test_exit_status_of_non_mismatch_failures_is_one() {
        let err = ExecutionError::from(ResolveError::NotFound {
            name: "tool".to_string(),
        });
        assert_eq!(err.mismatched_exit_code(), None);
        assert_eq!(err.exit_status(), 1);
    }

    #[tokio::test]
    async fn test_accept_any_returns_finished_process() {
        let context = quiet_context().with_wait(WaitOptions::accept_any());
        let finished = execute_with("sh", &ArgumentVector::from_args(["-c", "exit 4"]), &context)
            .await
            .unwrap();
        assert_eq!(finished.exit_code, 4);
        assert!(finished.output.string_output().is_err());
    }

    #[tokio::test]
    async fn test_launch_error_is_immediate() {
        let err = execute_with(
            "/definitely/not/here/tool",
            &ArgumentVector::default(),
            &quiet_context(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ExecutionError::Launch(LaunchError::NotFound { .. })));
        assert_eq!(err.mismatched_exit_code(), None);
        assert_eq!(err.exit_status(), 1);
    }

    // The only test that touches the process-wide defaults; every other test passes an
    // explicit context.
    #[tokio::test]
    async fn test_execute_uses_process_wide_defaults() {
        let previous = crate::models::default_start_options();
        crate::models::set_default_start_options(StartOptions::capture_all_quiet());

        let result = execute("sh", &ArgumentVector::from_args(["-c", "echo from-defaults"])).await;
        crate::models::set_default_start_options(previous);

        let finished = result.unwrap();
        assert_eq!(finished.output.string_output().unwrap(), "from-defaults");
        assert!(finished.error_output.is_captured());
    }

    #[tokio::test]
    async fn test_echo_enabled_launch_still_completes() {
        let context = ExecContext::default().with_start(StartOptions {
            output: OutputMode::Capture,
            ..StartOptions::default()
        });
        let finished = execute_with("sh", &ArgumentVector::raw("-c \"echo echoed\""), &context)
            .await
            .unwrap();
        assert_eq!(finished.output.string_output().unwrap(), "echoed");
    }
}
