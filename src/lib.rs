//! `runproc` launches external programs, captures their output without pipe deadlocks,
//! validates exit codes, and resolves executable names through the platform search helper.

pub mod cli;
pub mod constants;
pub mod core;
pub mod models;
pub mod system;

pub use models::{
    ArgumentVector, ExecContext, FinishedProcess, OutputMode, OutputNotCaptured, OutputResult,
    StartOptions, WaitOptions,
};
pub use system::executor::{
    ExecutionError, execute, execute_and_capture_output, execute_with, resolve_executable,
    try_resolve_executable,
};
