// src/cli.rs

//! Command-line surface of the `runproc` binary.

use crate::models::{ArgumentVector, ExecContext, OutputMode, WaitOptions};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// runproc: run programs, capture their output, check their exit codes.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// Configuration file to use instead of `~/.config/runproc/config.toml`.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// The action to perform.
    #[command(subcommand)]
    pub command: Command,
}

/// The actions the binary supports.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Runs a program and waits for it to finish.
    Run(RunArgs),
    /// Prints the absolute path of an executable found on the search path.
    Which {
        /// The short executable name to look up.
        name: String,
    },
    /// Prints the command line that encodes the given arguments.
    Quote {
        /// The arguments to encode.
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

/// Options of the `run` action.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Captures standard output and prints it after the program exits.
    #[arg(long)]
    pub capture_output: bool,

    /// Captures standard error and prints it after the program exits.
    #[arg(long)]
    pub capture_errors: bool,

    /// Does not print the launch trace line.
    #[arg(short, long)]
    pub quiet: bool,

    /// Fails unless the program exits with this code (default: from config, usually 0).
    #[arg(long, value_name = "CODE", allow_negative_numbers = true)]
    pub expect: Option<i32>,

    /// Accepts any exit code.
    #[arg(long, conflicts_with = "expect")]
    pub any_exit: bool,

    /// Joins the arguments into one command line and passes it through without escaping.
    #[arg(long)]
    pub raw: bool,

    /// Prints the finished process as JSON.
    #[arg(long)]
    pub json: bool,

    /// The program to run.
    pub program: PathBuf,

    /// Arguments for the program.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

impl RunArgs {
    /// Applies the flags on top of a base context. Flags only ever widen capture or
    /// quiet the echo; they never undo what the base context enables.
    pub fn context(&self, base: ExecContext) -> ExecContext {
        let mut context = base;
        if self.capture_output || self.json {
            context.start.output = OutputMode::Capture;
        }
        if self.capture_errors || self.json {
            context.start.error_output = OutputMode::Capture;
        }
        if self.quiet || self.json {
            context.start.suppress_echo = true;
        }
        if self.any_exit {
            context.wait = WaitOptions::accept_any();
        } else if let Some(code) = self.expect {
            context.wait = WaitOptions::expect(code);
        }
        context
    }

    /// The argument vector described by the flags.
    pub fn argument_vector(&self) -> ArgumentVector {
        if self.raw {
            ArgumentVector::raw(self.args.join(" "))
        } else {
            ArgumentVector::Arguments(self.args.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_run(argv: &[&str]) -> RunArgs {
        let cli = Cli::try_parse_from(argv).unwrap();
        match cli.command {
            Command::Run(args) => args,
            other => panic!("expected the run action, got {:?}", other),
        }
    }

    #[test]
    fn test_run_passes_program_flags_through() {
        let args = parse_run(&["runproc", "run", "-q", "git", "log", "--oneline", "-n", "3"]);
        assert!(args.quiet);
        assert_eq!(args.program, PathBuf::from("git"));
        assert_eq!(args.args, vec!["log", "--oneline", "-n", "3"]);
        assert_eq!(
            args.argument_vector(),
            ArgumentVector::from_args(["log", "--oneline", "-n", "3"])
        );
    }

    #[test]
    fn test_run_context_flags() {
        let args = parse_run(&["runproc", "run", "--capture-output", "--expect", "2", "tool"]);
        let context = args.context(ExecContext::default());
        assert_eq!(context.start.output, OutputMode::Capture);
        assert_eq!(context.start.error_output, OutputMode::Ignore);
        assert!(!context.start.suppress_echo);
        assert_eq!(context.wait, WaitOptions::expect(2));
    }

    #[test]
    fn test_json_implies_full_capture() {
        let args = parse_run(&["runproc", "run", "--json", "--any-exit", "tool"]);
        let context = args.context(ExecContext::default());
        assert_eq!(context.start.output, OutputMode::Capture);
        assert_eq!(context.start.error_output, OutputMode::Capture);
        assert!(context.start.suppress_echo);
        assert_eq!(context.wait, WaitOptions::accept_any());
    }

    #[test]
    fn test_expect_conflicts_with_any_exit() {
        let result = Cli::try_parse_from(["runproc", "run", "--any-exit", "--expect", "1", "tool"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_raw_joins_arguments() {
        let args = parse_run(&["runproc", "run", "--raw", "tool", "\"a b\"", "c"]);
        assert_eq!(args.argument_vector(), ArgumentVector::raw("\"a b\" c"));
    }

    #[test]
    fn test_quote_accepts_hyphen_values() {
        let cli = Cli::try_parse_from(["runproc", "quote", "-x", "two words"]).unwrap();
        match cli.command {
            Command::Quote { args } => assert_eq!(args, vec!["-x", "two words"]),
            other => panic!("expected the quote action, got {:?}", other),
        }
    }
}
