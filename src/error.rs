//! Error types for advlock.
//!
//! Uses thiserror for derive macros. Every variant that wraps an OS failure
//! keeps the underlying `io::Error` as its source.

use crate::exit_codes;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for lock operations.
#[derive(Error, Debug)]
pub enum LockError {
    /// The lock file could not be opened or created for read/write.
    #[error("failed to open lock file '{}': {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// An I/O error occurred while acquiring the lock. Contention is not an error.
    #[error("failed to acquire lock '{}': {source}", .path.display())]
    Acquire {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A blocking acquisition was attempted on a lock this process already holds.
    #[error("lock '{}' is already held by this process", .path.display())]
    HeldInProcess { path: PathBuf },

    /// The lock is held by another process (reported by the CLI only).
    #[error("lock '{}' is held by another process", .path.display())]
    Busy { path: PathBuf },

    /// Releasing a held lock failed.
    #[error("failed to release lock '{}': {source}", .path.display())]
    Release {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Releasing OS resources on close failed. The handle itself is closed regardless.
    #[error("failed to close lock file '{}': {source}", .path.display())]
    Close {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A command run under the lock could not be started or awaited.
    #[error("{0}")]
    Command(String),
}

impl LockError {
    /// Returns the CLI exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            LockError::Open { .. }
            | LockError::Acquire { .. }
            | LockError::Release { .. }
            | LockError::Close { .. } => exit_codes::IO_FAILURE,
            LockError::HeldInProcess { .. } | LockError::Busy { .. } => exit_codes::LOCK_BUSY,
            LockError::Command(_) => exit_codes::USER_ERROR,
        }
    }
}

/// Result type alias for lock operations.
pub type Result<T> = std::result::Result<T, LockError>;
