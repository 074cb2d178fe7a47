// src/system/echo.rs

//! The console trace line printed for each launch.

use colored::Colorize;
use lazy_static::lazy_static;
use std::io::Write;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

lazy_static! {
    // Serializes the multi-part trace line so concurrent launches never interleave.
    static ref ECHO_LOCK: Mutex<()> = Mutex::new(());
}

/// Writes the trace line for a launched process to `out`: pid, quoted program path,
/// command line. Nothing is written when `suppress` is set.
///
/// The whole line is written while holding a global lock, so the fields of two
/// concurrently launched processes never share a line.
pub(crate) fn echo_launch<W: Write>(
    out: &mut W,
    suppress: bool,
    pid: Option<u32>,
    program: &Path,
    command_line: &str,
) {
    if suppress {
        return;
    }
    let pid_field = pid.map_or_else(|| "?".to_string(), |id| id.to_string());

    let _guard = ECHO_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    // Write failures (closed stdout) are not a reason to fail the launch.
    let _ = write!(out, "{} ", format!("[{}]", pid_field).dimmed());
    let _ = write!(out, "{} ", format!("\"{}\"", program.display()).cyan().bold());
    let _ = writeln!(out, "{}", command_line.green());
    let _ = out.flush();
}
