//! Apply and check command implementations
//!
//! Both resolve flags or a params file into [`ReconcileParams`], run the
//! reconciler once and print either the result record or the error record.

use std::fs;

use colored::Colorize;
use serde::Serialize;

use reconcile_core::{
    ErrorReport, ReconcileError, ReconcileOptions, ReconcileParams, ReconcileResult, reconcile,
};

use crate::cli::TargetArgs;
use crate::error::{CliError, Result};

/// Run the apply command
///
/// Writes the desired content unless `dry_run` is set.
pub fn run_apply(target: TargetArgs, dry_run: bool, json: bool) -> Result<()> {
    let mut params = build_params(target)?;
    params.dry_run |= dry_run;
    execute(&params, json)
}

/// Run the check command
///
/// Always a dry run: reports what apply would do.
pub fn run_check(target: TargetArgs, json: bool) -> Result<()> {
    let mut params = build_params(target)?;
    params.dry_run = true;
    execute(&params, json)
}

/// Merge a params file (if any) with command-line flags.
///
/// Flags can only switch features on or tighten settings; a params file
/// supplies path and content on its own.
pub fn build_params(target: TargetArgs) -> Result<ReconcileParams> {
    let mut params = match &target.params {
        Some(file) => ReconcileParams::load(file)?,
        None => {
            let path = target
                .path
                .clone()
                .ok_or_else(|| CliError::user("missing --path (or --params)"))?;
            let content = match (&target.content, &target.content_file) {
                (Some(content), _) => content.clone(),
                (None, Some(file)) => fs::read_to_string(file).map_err(|e| {
                    CliError::user(format!(
                        "could not read content file {}: {}",
                        file.display(),
                        e
                    ))
                })?,
                (None, None) => {
                    return Err(CliError::user("missing --content or --content-file"));
                }
            };
            ReconcileParams::new(path, content)
        }
    };

    params.diff |= target.diff;
    params.lock |= target.lock;
    if target.lock_timeout_ms.is_some() {
        params.lock_timeout_ms = target.lock_timeout_ms;
    }
    if target.no_fsync {
        params.fsync = Some(false);
    }

    Ok(params)
}

fn execute(params: &ReconcileParams, json: bool) -> Result<()> {
    let outcome = params
        .validate()
        .and_then(|(desired, options)| reconcile(&desired, &options).map(|r| (r, options)));

    match outcome {
        Ok((result, options)) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_result(&result, &options);
            }
            Ok(())
        }
        Err(err) => {
            if json {
                print_failure(&err)?;
            }
            Err(err.into())
        }
    }
}

#[derive(Serialize)]
struct FailureOutput {
    failed: bool,
    error: ErrorReport,
}

fn print_failure(err: &ReconcileError) -> Result<()> {
    let output = FailureOutput {
        failed: true,
        error: err.report(),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_result(result: &ReconcileResult, options: &ReconcileOptions) {
    match (result.changed, options.dry_run) {
        (false, _) => println!(
            "{} {} already has the desired content.",
            "OK".green().bold(),
            result.dest.cyan()
        ),
        (true, true) => println!(
            "{} {} would be changed (dry run).",
            "DRIFTED".yellow().bold(),
            result.dest.cyan()
        ),
        (true, false) => println!(
            "{} {} updated.",
            "CHANGED".green().bold(),
            result.dest.cyan()
        ),
    }

    if let Some(diff) = &result.diff {
        println!();
        for line in diff.unified.lines() {
            if line.starts_with("+++") || line.starts_with("---") {
                println!("{}", line.bold());
            } else if line.starts_with('+') {
                println!("{}", line.green());
            } else if line.starts_with('-') {
                println!("{}", line.red());
            } else if line.starts_with("@@") {
                println!("{}", line.cyan());
            } else {
                println!("{}", line);
            }
        }
    }
}
