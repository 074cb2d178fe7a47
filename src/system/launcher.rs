// src/system/launcher.rs

//! Starting child processes with the requested stream wiring.

use crate::{
    core::arguments,
    models::{ArgumentVector, OutputMode, StartOptions},
    system::{
        capture::{StreamCapture, StreamKind},
        echo,
    },
};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use thiserror::Error;
use tokio::process::{Child, ChildStderr, ChildStdout, Command};

/// Errors raised while starting a process. Always reported synchronously by [`start`].
#[derive(Error, Debug)]
pub enum LaunchError {
    /// The program path names a file that does not exist.
    #[error("Executable '{}' does not exist or is not a file.", .program.display())]
    NotFound {
        /// The program that was requested.
        program: PathBuf,
    },
    /// The operating system refused to create the process.
    #[error("Executable '{}' could not be started: {source}", .program.display())]
    Spawn {
        /// The program that was requested.
        program: PathBuf,
        /// The underlying OS error.
        #[source]
        source: std::io::Error,
    },
    /// A stream configured for capture came back without a pipe.
    #[error("The {stream} pipe of '{}' was not available after spawn.", .program.display())]
    MissingPipe {
        /// The program that was started.
        program: PathBuf,
        /// The stream whose pipe was missing.
        stream: StreamKind,
    },
}

/// A child process that has been started and not yet waited on.
///
/// Holds the OS handle and, for each captured stream, the drain already running in the
/// background. Consumed by [`RunningProcess::wait`](crate::system::coordinator).
#[derive(Debug)]
pub struct RunningProcess {
    pub(crate) child: Child,
    pub(crate) program: PathBuf,
    pub(crate) command_line: String,
    pub(crate) stdout: Option<StreamCapture>,
    pub(crate) stderr: Option<StreamCapture>,
}

impl RunningProcess {
    /// The OS process id, if the child has not been reaped yet.
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// The program path the process was started with.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// The command line the process was started with.
    pub fn command_line(&self) -> &str {
        &self.command_line
    }
}

/// Starts `program` with `args`, wiring its output streams as `options` requests.
///
/// A raw command line is used unmodified; an argument list is encoded first. Captured
/// streams begin draining before this function returns. Must be called from within a
/// tokio runtime.
///
/// # Errors
/// Returns a [`LaunchError`] if the program does not exist or cannot be spawned.
pub fn start(
    program: &Path,
    args: &ArgumentVector,
    options: &StartOptions,
) -> Result<RunningProcess, LaunchError> {
    // 1. Build the command line; a raw one is used as given.
    let command_line = match args {
        ArgumentVector::CommandLine(raw) => raw.clone(),
        ArgumentVector::Arguments(list) => arguments::encode_arguments(list),
    };

    // 2. Fail fast on a path that cannot name a program.
    ensure_program_exists(program)?;

    // 3. Wire the streams: captured ones are piped, the rest inherit ours.
    let mut command = Command::new(program);
    apply_command_line(&mut command, &command_line);
    command
        .stdin(Stdio::inherit())
        .stdout(stdio_for(options.output))
        .stderr(stdio_for(options.error_output));

    // 4. Spawn.
    let mut child = command.spawn().map_err(|source| LaunchError::Spawn {
        program: program.to_path_buf(),
        source,
    })?;

    // 5. Start draining before anything else can block on a full pipe.
    let (stdout_pipe, stderr_pipe) = take_pipes(&mut child, program, options)?;
    let stdout = stdout_pipe.map(|pipe| StreamCapture::spawn(StreamKind::Stdout, pipe));
    let stderr = stderr_pipe.map(|pipe| StreamCapture::spawn(StreamKind::Stderr, pipe));

    // 6. Trace the launch.
    log::debug!(
        "Started '{}' (pid {:?}) with command line: {}",
        program.display(),
        child.id(),
        command_line
    );
    echo::echo_launch(
        &mut std::io::stdout(),
        options.suppress_echo,
        child.id(),
        program,
        &command_line,
    );

    Ok(RunningProcess {
        child,
        program: program.to_path_buf(),
        command_line,
        stdout,
        stderr,
    })
}

/// Takes the pipe of every captured stream. Both are taken before any drain starts; if
/// one is missing the child is killed and nothing is left running.
fn take_pipes(
    child: &mut Child,
    program: &Path,
    options: &StartOptions,
) -> Result<(Option<ChildStdout>, Option<ChildStderr>), LaunchError> {
    let stdout = match options.output {
        OutputMode::Capture => child.stdout.take().ok_or(StreamKind::Stdout).map(Some),
        OutputMode::Ignore => Ok(None),
    };
    let stderr = match options.error_output {
        OutputMode::Capture => child.stderr.take().ok_or(StreamKind::Stderr).map(Some),
        OutputMode::Ignore => Ok(None),
    };

    match (stdout, stderr) {
        (Ok(stdout), Ok(stderr)) => Ok((stdout, stderr)),
        (Err(stream), _) | (_, Err(stream)) => {
            if let Err(e) = child.start_kill() {
                log::warn!("Failed to kill '{}' after a missing pipe: {}", program.display(), e);
            }
            Err(LaunchError::MissingPipe {
                program: program.to_path_buf(),
                stream,
            })
        }
    }
}

fn stdio_for(mode: OutputMode) -> Stdio {
    match mode {
        OutputMode::Capture => Stdio::piped(),
        OutputMode::Ignore => Stdio::inherit(),
    }
}

/// A program given with a directory component must name an existing file. Bare names are
/// left to the OS search path and surface as spawn errors.
fn ensure_program_exists(program: &Path) -> Result<(), LaunchError> {
    let has_directory = program.is_absolute() || program.components().count() > 1;
    if has_directory && !program.is_file() {
        return Err(LaunchError::NotFound {
            program: program.to_path_buf(),
        });
    }
    Ok(())
}

#[cfg(windows)]
fn apply_command_line(command: &mut Command, command_line: &str) {
    if !command_line.is_empty() {
        command.raw_arg(command_line);
    }
}

// The Unix process facility takes an argv, so the line is split back with the same rules
// that produced it.
#[cfg(not(windows))]
fn apply_command_line(command: &mut Command, command_line: &str) {
    command.args(arguments::split_command_line(command_line));
}
