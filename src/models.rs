// src/models.rs

//! Value types shared by the launcher, the coordinator and the resolver.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::sync::{PoisonError, RwLock};
use thiserror::Error;

lazy_static! {
    static ref DEFAULT_START_OPTIONS: RwLock<StartOptions> = RwLock::new(StartOptions::default());
}

/// The arguments handed to a child process.
///
/// The two representations never mix: either a list of raw arguments that still
/// need escaping, or one command line that is already escaped and passed through as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentVector {
    /// Raw arguments, encoded into a command line at launch time.
    Arguments(Vec<String>),
    /// A pre-escaped command line, used verbatim.
    CommandLine(String),
}

impl ArgumentVector {
    /// Builds the argument-list variant from anything yielding string-like items.
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Arguments(args.into_iter().map(Into::into).collect())
    }

    /// Builds the raw command-line variant.
    pub fn raw(command_line: impl Into<String>) -> Self {
        Self::CommandLine(command_line.into())
    }
}

impl Default for ArgumentVector {
    fn default() -> Self {
        Self::Arguments(Vec::new())
    }
}

/// How a child's output stream is wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// The stream is inherited from the parent and never read.
    #[default]
    Ignore,
    /// The stream is piped and drained into memory.
    Capture,
}

/// Options applied when a process is launched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StartOptions {
    /// Wiring of the child's standard output.
    pub output: OutputMode,
    /// Wiring of the child's standard error.
    pub error_output: OutputMode,
    /// Skips the console trace line for this launch.
    pub suppress_echo: bool,
}

impl StartOptions {
    /// Options capturing both streams with echo suppressed.
    pub fn capture_all_quiet() -> Self {
        Self {
            output: OutputMode::Capture,
            error_output: OutputMode::Capture,
            suppress_echo: true,
        }
    }
}

/// Returns the current process-wide default start options.
///
/// The value is whatever was last installed with [`set_default_start_options`]. A launch
/// that races a concurrent update may observe either value.
pub fn default_start_options() -> StartOptions {
    *DEFAULT_START_OPTIONS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
}

/// Replaces the process-wide default start options.
pub fn set_default_start_options(options: StartOptions) {
    log::debug!("Default start options replaced: {:?}", options);
    *DEFAULT_START_OPTIONS
        .write()
        .unwrap_or_else(PoisonError::into_inner) = options;
}

/// Options applied when waiting for a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// `Some(n)` fails the wait unless the exit code is `n`; `None` accepts any code.
    pub expected_exit_code: Option<i32>,
}

impl WaitOptions {
    /// Accepts every exit code.
    pub fn accept_any() -> Self {
        Self {
            expected_exit_code: None,
        }
    }

    /// Requires the given exit code.
    pub fn expect(code: i32) -> Self {
        Self {
            expected_exit_code: Some(code),
        }
    }
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self::expect(0)
    }
}

/// Explicit configuration threaded through each execution call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecContext {
    /// Options used at launch.
    pub start: StartOptions,
    /// Options used at wait.
    pub wait: WaitOptions,
}

impl ExecContext {
    /// Snapshots the process-wide default start options with the default wait options.
    ///
    /// The snapshot is taken at call time; a concurrent [`set_default_start_options`]
    /// may or may not be visible.
    pub fn from_defaults() -> Self {
        Self {
            start: default_start_options(),
            wait: WaitOptions::default(),
        }
    }

    /// Replaces the start options.
    pub fn with_start(mut self, start: StartOptions) -> Self {
        self.start = start;
        self
    }

    /// Replaces the wait options.
    pub fn with_wait(mut self, wait: WaitOptions) -> Self {
        self.wait = wait;
        self
    }
}

/// Raised when output is read from a stream that was never captured.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Output was read from a stream that was not captured. Start the process with OutputMode::Capture.")]
pub struct OutputNotCaptured;

/// The outcome of one output stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", content = "text", rename_all = "lowercase")]
pub enum OutputResult {
    /// The stream was not captured.
    Ignored,
    /// The captured text, trailing whitespace trimmed.
    Captured(String),
}

impl OutputResult {
    /// Returns the captured text.
    ///
    /// # Errors
    /// Returns [`OutputNotCaptured`] when the stream was not captured. This is a
    /// contract violation by the caller, not a runtime condition.
    pub fn string_output(&self) -> Result<&str, OutputNotCaptured> {
        match self {
            Self::Captured(text) => Ok(text),
            Self::Ignored => Err(OutputNotCaptured),
        }
    }

    /// Whether the stream was captured.
    pub fn is_captured(&self) -> bool {
        matches!(self, Self::Captured(_))
    }
}

/// The terminal state of a process that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinishedProcess {
    /// The observed exit code.
    pub exit_code: i32,
    /// Standard output.
    pub output: OutputResult,
    /// Standard error.
    pub error_output: OutputResult,
}

impl FinishedProcess {
    /// Whether the process exited with code 0.
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}
