//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Make a file hold exactly the content you ask for, and report whether it had to change
#[derive(Parser, Debug)]
#[command(name = "reconcile")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print the result or error record as JSON on stdout
    #[arg(long, global = true)]
    pub json: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Bring the file to the desired content
    ///
    /// Creates the file if it is missing and replaces its content if it
    /// differs. Parent directories are never created.
    ///
    /// Examples:
    ///   reconcile apply -p /tmp/a.txt -c hello
    ///   reconcile apply -p /etc/motd --content-file motd.txt --diff
    ///   reconcile apply --params task.yaml --dry-run
    Apply {
        #[command(flatten)]
        target: TargetArgs,

        /// Preview the change without applying it
        #[arg(long)]
        dry_run: bool,
    },

    /// Report whether `apply` would change anything, without writing
    Check {
        #[command(flatten)]
        target: TargetArgs,
    },
}

/// Where the file is and what it should contain
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct TargetArgs {
    /// Path of the file to manage
    #[arg(short, long, conflicts_with = "params")]
    pub path: Option<String>,

    /// Desired content, written verbatim
    #[arg(short, long, conflicts_with_all = ["content_file", "params"], allow_hyphen_values = true)]
    pub content: Option<String>,

    /// Read the desired content from a file
    #[arg(long, value_name = "FILE", conflicts_with = "params")]
    pub content_file: Option<PathBuf>,

    /// Load parameters from a JSON, TOML or YAML file
    #[arg(long, value_name = "FILE")]
    pub params: Option<PathBuf>,

    /// Show a unified diff of the change
    #[arg(long)]
    pub diff: bool,

    /// Hold an advisory lock on the file while reconciling
    #[arg(long)]
    pub lock: bool,

    /// Give up waiting for the lock after this many milliseconds
    #[arg(long, value_name = "MS")]
    pub lock_timeout_ms: Option<u64>,

    /// Do not fsync the file and its directory after writing
    #[arg(long)]
    pub no_fsync: bool,
}
