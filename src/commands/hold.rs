//! Implementation of the `advlock try` and `advlock hold` commands.
//!
//! Both acquire the lock and then keep it while either a child command runs
//! or stdin stays open. `locked` is printed to stdout once the lock is held so
//! a supervising process can wait for it.

use super::open_target;
use crate::cli::HoldArgs;
use advlock::{FileLockOptions, Lock, LockError, Locked, Result, exit_codes};
use std::io::{self, Write};
use std::process::Command;
use tracing::info;

/// Execute the `advlock try` command.
///
/// Fails with `LockError::Busy` (exit 3) if the lock is held elsewhere.
pub fn cmd_try(args: HoldArgs, options: &FileLockOptions) -> Result<i32> {
    let lock = open_target(&args.target, options)?;
    let code = match lock.try_lock()?.into_locked() {
        Some(locked) => hold_while(locked, &args.command)?,
        None => {
            return Err(LockError::Busy {
                path: lock.path().to_path_buf(),
            });
        }
    };
    lock.close()?;
    Ok(code)
}

/// Execute the `advlock hold` command, waiting as long as it takes.
pub fn cmd_hold(args: HoldArgs, options: &FileLockOptions) -> Result<i32> {
    let lock = open_target(&args.target, options)?;
    info!("waiting for lock: {}", lock.path().display());
    let code = hold_while(lock.lock()?, &args.command)?;
    lock.close()?;
    Ok(code)
}

/// Keep `locked` until the work finishes, then release it.
fn hold_while(locked: Locked<'_>, command: &[String]) -> Result<i32> {
    announce_locked()?;

    let code = match command.split_first() {
        Some((program, rest)) => run_child(program, rest)?,
        None => {
            wait_for_stdin_eof()?;
            exit_codes::SUCCESS
        }
    };

    locked.release()?;
    Ok(code)
}

fn announce_locked() -> Result<()> {
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "locked")
        .and_then(|()| stdout.flush())
        .map_err(|e| LockError::Command(format!("failed to write to stdout: {}", e)))
}

/// Run the child command to completion and return its exit code.
fn run_child(program: &str, args: &[String]) -> Result<i32> {
    info!("running under lock: {} {}", program, args.join(" "));
    let status = Command::new(program)
        .args(args)
        .status()
        .map_err(|e| LockError::Command(format!("failed to run '{}': {}", program, e)))?;

    // Terminated by a signal: no exit code to forward.
    Ok(status.code().unwrap_or(exit_codes::USER_ERROR))
}

fn wait_for_stdin_eof() -> Result<()> {
    io::copy(&mut io::stdin().lock(), &mut io::sink())
        .map(|_| ())
        .map_err(|e| LockError::Command(format!("failed to read stdin: {}", e)))
}
