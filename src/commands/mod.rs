//! Command implementations for advlock.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations. Each handler returns the process exit code on success.

mod hold;
mod probe;

use crate::cli::{Cli, Command, LockTarget};
use advlock::{FileLock, FileLockOptions, Result};

/// Dispatch a command to its implementation.
pub fn dispatch(cli: Cli) -> Result<i32> {
    let options = FileLockOptions::new().with_create_parent_dirs(cli.create_dirs);
    match cli.command {
        Command::Probe(args) => probe::cmd_probe(args, &options),
        Command::Try(args) => hold::cmd_try(args, &options),
        Command::Hold(args) => hold::cmd_hold(args, &options),
    }
}

/// Open the lock file named on the command line.
fn open_target(target: &LockTarget, options: &FileLockOptions) -> Result<FileLock> {
    FileLock::open_with(&target.path, options)
}
