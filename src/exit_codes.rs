//! Exit code constants for the advlock CLI.
//!
//! - 0: Success (or the lock is free, for `probe`)
//! - 1: User error (bad args, child command could not run)
//! - 2: I/O failure (open, acquire, release, close)
//! - 3: Lock busy (held by another process, or already held by this one)

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments or a command that could not be started.
pub const USER_ERROR: i32 = 1;

/// I/O failure while opening, locking, unlocking or closing the lock file.
pub const IO_FAILURE: i32 = 2;

/// The lock is currently held elsewhere.
pub const LOCK_BUSY: i32 = 3;
