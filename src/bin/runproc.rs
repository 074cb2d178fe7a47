// src/bin/runproc.rs

use anyhow::Result;
use clap::Parser;
use colored::*;
use runproc::{
    ExecContext, ExecutionError,
    cli::{Cli, Command, RunArgs},
    core::{arguments, config_loader},
    execute_with,
    models::FinishedProcess,
};

/// The main entry point of the `runproc` binary.
/// It sets up logging, parses arguments, dispatches the action, and performs
/// centralized error handling.
#[tokio::main]
async fn main() {
    env_logger::init();

    match run_cli(Cli::parse()).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("\n{}: {}", "Error".red().bold(), e);
            // An exit-code mismatch exits with the child's own code, like a shell would,
            // but never with 0.
            let code = e
                .downcast_ref::<ExecutionError>()
                .map_or(1, ExecutionError::exit_status);
            std::process::exit(code);
        }
    }
}

/// Routes the parsed command line to its action and returns the exit code to use.
async fn run_cli(cli: Cli) -> Result<i32> {
    log::debug!("CLI args parsed: {:?}", cli);

    let config = match &cli.config {
        Some(path) => config_loader::load_from_path(path)?,
        None => config_loader::load()?,
    };
    config.apply_as_default();

    match cli.command {
        Command::Run(args) => run(&args, &config.exec_context()).await,
        Command::Which { name } => {
            let path = config
                .resolver
                .resolve(&name)
                .await
                .map_err(ExecutionError::from)?;
            println!("{}", path.display());
            Ok(0)
        }
        Command::Quote { args } => {
            println!("{}", arguments::encode_arguments(&args));
            Ok(0)
        }
    }
}

async fn run(args: &RunArgs, configured: &ExecContext) -> Result<i32> {
    // The start options come from the process-wide default the config just installed.
    let base = ExecContext::from_defaults().with_wait(configured.wait);
    let context = args.context(base);

    let finished = execute_with(&args.program, &args.argument_vector(), &context).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&finished)?);
    } else {
        print_captured(&finished);
    }
    Ok(finished.exit_code)
}

fn print_captured(finished: &FinishedProcess) {
    if let Ok(text) = finished.output.string_output() {
        if !text.is_empty() {
            println!("{}", text);
        }
    }
    if let Ok(text) = finished.error_output.string_output() {
        if !text.is_empty() {
            eprintln!("{}", text.dimmed());
        }
    }
}
