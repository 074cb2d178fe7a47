// src/system/resolver.rs

//! Executable resolution through the platform's search helper (`which` / `where`).
//!
//! The helper's exit-code contract (0 = found, 1 = not found, anything else = failure) is
//! interpreted here and nowhere else; the launcher and the coordinator treat the helper like
//! any other process.

use crate::{
    constants::{SEARCH_HELPER_NOT_FOUND_CODE, UNIX_SEARCH_HELPER, WINDOWS_SEARCH_HELPER},
    models::{ArgumentVector, StartOptions, WaitOptions},
    system::{
        coordinator::{self, WaitError},
        launcher::{self, LaunchError},
    },
};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

lazy_static! {
    static ref EXECUTABLE_EXTENSION_RE: Regex =
        Regex::new(r"(?i)\.(exe|com|bat|cmd)$").expect("executable extension pattern is valid");
}

/// Errors raised while resolving an executable.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// The search helper itself could not be started.
    #[error("Could not start the executable search helper: {0}")]
    Launch(#[from] LaunchError),
    /// Waiting on the search helper failed.
    #[error("Executable search helper failed: {0}")]
    Wait(#[from] WaitError),
    /// The search helper exited with a code other than "found" or "not found".
    #[error("Searching for '{name}' failed (exit code {code}): {stderr}")]
    ResolutionFailure {
        /// The name that was searched for.
        name: String,
        /// The helper's exit code.
        code: i32,
        /// The helper's diagnostic output, trimmed.
        stderr: String,
    },
    /// No executable with the given name was found on the search path.
    #[error("Executable '{name}' was not found on the search path.")]
    NotFound {
        /// The name that was searched for.
        name: String,
    },
}

/// Resolves short executable names to absolute paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutableResolver {
    /// The search helper program, invoked as `<helper> <name>`.
    pub helper: PathBuf,
}

impl Default for ExecutableResolver {
    fn default() -> Self {
        let helper = if cfg!(target_os = "windows") {
            WINDOWS_SEARCH_HELPER
        } else {
            UNIX_SEARCH_HELPER
        };
        Self::with_helper(helper)
    }
}

impl ExecutableResolver {
    /// A resolver that runs the given helper program instead of the platform default.
    pub fn with_helper(helper: impl Into<PathBuf>) -> Self {
        Self {
            helper: helper.into(),
        }
    }

    /// Searches for `name`, returning `None` when the helper reports no match.
    ///
    /// # Errors
    /// Fails if the helper cannot be run, or exits with a code other than 0 or 1; in the
    /// latter case the error carries the helper's stderr.
    pub async fn try_resolve(&self, name: &str) -> Result<Option<PathBuf>, ResolveError> {
        let process = launcher::start(
            &self.helper,
            &ArgumentVector::from_args([name]),
            &StartOptions::capture_all_quiet(),
        )?;
        let finished = coordinator::wait(process, &WaitOptions::accept_any()).await?;

        match finished.exit_code {
            0 => {
                let stdout = finished.output.string_output().unwrap_or_default();
                let found = select_candidate(stdout);
                log::debug!("Resolved '{}' to {:?}", name, found);
                Ok(found)
            }
            SEARCH_HELPER_NOT_FOUND_CODE => {
                log::debug!("'{}' is not on the search path", name);
                Ok(None)
            }
            code => Err(ResolveError::ResolutionFailure {
                name: name.to_string(),
                code,
                stderr: finished
                    .error_output
                    .string_output()
                    .unwrap_or_default()
                    .trim()
                    .to_string(),
            }),
        }
    }

    /// Searches for `name` and requires a match.
    ///
    /// # Errors
    /// As [`try_resolve`](Self::try_resolve), plus [`ResolveError::NotFound`] when there
    /// is no match.
    pub async fn resolve(&self, name: &str) -> Result<PathBuf, ResolveError> {
        self.try_resolve(name)
            .await?
            .ok_or_else(|| ResolveError::NotFound {
                name: name.to_string(),
            })
    }
}

/// Picks the first helper output line that passes the platform executability check.
fn select_candidate(helper_output: &str) -> Option<PathBuf> {
    helper_output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(Path::new)
        .find(|path| is_platform_executable(path))
        .map(|path| dunce::simplified(path).to_path_buf())
}

/// Whether the path ends in an extension the Windows loader runs directly.
pub fn has_executable_extension(path: &Path) -> bool {
    EXECUTABLE_EXTENSION_RE.is_match(&path.to_string_lossy())
}

/// Whether the path is a regular file with at least one execute permission bit set.
#[cfg(unix)]
pub fn is_executable_file(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// The executability heuristic for the current platform.
pub fn is_platform_executable(path: &Path) -> bool {
    #[cfg(windows)]
    {
        has_executable_extension(path)
    }
    #[cfg(unix)]
    {
        is_executable_file(path)
    }
    #[cfg(not(any(windows, unix)))]
    {
        path.is_file()
    }
}
