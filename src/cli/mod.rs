//! CLI argument parsing for advlock.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

/// advlock: coordinate processes through an advisory lock on a file.
///
/// The lock file is created if absent and is never written to or deleted.
/// Locks are released when the holding process exits.
#[derive(Parser, Debug)]
#[command(name = "advlock")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    ///
    /// `RUST_LOG` directives are applied on top.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Create missing parent directories of the lock file.
    #[arg(long, global = true)]
    pub create_dirs: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse arguments from the process command line.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Available commands for advlock.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Report whether the lock is free without keeping it.
    ///
    /// Prints `free` (exit 0) or `held` (exit 3).
    Probe(ProbeArgs),

    /// Acquire the lock without waiting, then hold it.
    ///
    /// Exits with code 3 if the lock is held elsewhere.
    Try(HoldArgs),

    /// Wait for the lock, then hold it.
    Hold(HoldArgs),
}

/// The lock file a command operates on.
#[derive(Args, Debug)]
pub struct LockTarget {
    /// Path to the lock file.
    pub path: PathBuf,
}

/// Arguments for the `probe` command.
#[derive(Args, Debug)]
pub struct ProbeArgs {
    #[command(flatten)]
    pub target: LockTarget,

    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `try` and `hold` commands.
#[derive(Args, Debug)]
pub struct HoldArgs {
    #[command(flatten)]
    pub target: LockTarget,

    /// Command to run while the lock is held.
    ///
    /// Without a command, the lock is held until stdin is closed.
    #[arg(last = true)]
    pub command: Vec<String>,
}
