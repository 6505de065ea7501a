//! Content reconciler CLI
//!
//! Thin host around `reconcile-core`: parses flags or a params file, runs
//! one reconcile and reports the outcome. Exit status is 0 on success and 1
//! on any failure.

mod cli;
mod commands;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use error::{CliError, Result};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.verbose)
        .map_err(|e| CliError::user(format!("failed to initialize logging: {}", e)))?;
    tracing::debug!("Verbose mode enabled");

    match cli.command {
        Some(cmd) => execute_command(cmd, cli.json),
        None => {
            println!("{} content reconciler", "reconcile".green().bold());
            println!();
            println!("Run {} for available commands.", "reconcile --help".cyan());
            Ok(())
        }
    }
}

fn execute_command(cmd: Commands, json: bool) -> Result<()> {
    match cmd {
        Commands::Apply { target, dry_run } => commands::run_apply(target, dry_run, json),
        Commands::Check { target } => commands::run_check(target, json),
    }
}
