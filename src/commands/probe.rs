//! Implementation of the `advlock probe` command.

use super::open_target;
use crate::cli::ProbeArgs;
use advlock::{FileLockOptions, Lock, LockError, Result, exit_codes};
use serde::Serialize;
use std::path::PathBuf;

/// Machine-readable probe result for `--json`.
#[derive(Debug, Serialize)]
struct ProbeReport {
    path: PathBuf,
    free: bool,
}

/// Execute the `advlock probe` command.
///
/// Prints `free` and exits 0, or prints `held` and exits with `LOCK_BUSY`.
pub fn cmd_probe(args: ProbeArgs, options: &FileLockOptions) -> Result<i32> {
    let lock = open_target(&args.target, options)?;
    let free = lock.probe()?;
    lock.close()?;

    if args.json {
        let report = ProbeReport {
            path: args.target.path,
            free,
        };
        let json = serde_json::to_string(&report)
            .map_err(|e| LockError::Command(format!("failed to serialize probe result: {}", e)))?;
        println!("{}", json);
    } else {
        println!("{}", if free { "free" } else { "held" });
    }

    Ok(if free {
        exit_codes::SUCCESS
    } else {
        exit_codes::LOCK_BUSY
    })
}
