//! Locking subsystem for advlock.
//!
//! This module implements cross-process mutual exclusion on top of OS advisory
//! locks:
//! - [`FileLock`]: an exclusive advisory lock on a file (`flock` on Unix,
//!   `LockFileEx` on Windows)
//! - [`MemoryLock`]: an in-process stand-in with the same contract, for tests
//!   and single-process callers
//!
//! # Acquisition Modes
//!
//! - [`Lock::lock`] blocks until the lock is held
//! - [`Lock::try_lock`] makes a single non-blocking attempt
//! - [`Lock::probe`] acquires and immediately releases, reporting whether the
//!   lock was free at that instant
//!
//! # Tokens
//!
//! A successful acquisition yields a [`Locked`] token that borrows the lock.
//! Non-blocking attempts yield [`TryLocked`], which is either `Acquired` or
//! `NotAcquired`. Tokens release the lock when dropped; `release` consumes
//! the token so a lock cannot be released twice.
//!
//! # Reentrancy
//!
//! OS advisory locks do not report reentrant acquisition consistently across
//! platforms, so held files are tracked in a process-wide table. A
//! non-blocking attempt on a file this process already holds reports
//! `NotAcquired`; a blocking attempt fails with
//! [`LockError::HeldInProcess`](crate::error::LockError::HeldInProcess)
//! instead of deadlocking.

mod file;
mod guard;
mod memory;
mod options;
mod registry;

#[cfg(test)]
mod tests;

use crate::error::Result;

// Re-export public API
pub use file::FileLock;
pub use guard::{Locked, TryLocked};
pub use memory::MemoryLock;
pub use options::FileLockOptions;

/// Backend hook used by tokens to release a held lock.
///
/// Private to this module so that only a token issued by an acquisition can
/// release a lock, and only once.
trait Unlock: Sync {
    /// Release the lock currently held through this backend.
    fn unlock(&self) -> Result<()>;
}

/// Capability interface for an exclusive lock.
pub trait Lock {
    /// Block until the lock is acquired.
    fn lock(&self) -> Result<Locked<'_>>;

    /// Attempt to acquire the lock without blocking.
    ///
    /// Contention, including a lock already held by this process, is reported
    /// as [`TryLocked::NotAcquired`] rather than as an error.
    fn try_lock(&self) -> Result<TryLocked<'_>>;

    /// Report whether the lock is free right now, without keeping it.
    ///
    /// The answer can be stale by the time it is read; treat it as a hint.
    fn probe(&self) -> Result<bool> {
        let attempt = self.try_lock()?;
        let free = attempt.is_locked();
        attempt.release()?;
        Ok(free)
    }

    /// Close the lock and release its OS resources.
    ///
    /// Fails with [`LockError::Close`](crate::error::LockError::Close) only if
    /// unlocking a still-held lock fails. Closing the OS handle goes through
    /// `Drop for std::fs::File`, which discards close errors, so those are not
    /// observable here.
    fn close(self) -> Result<()>
    where
        Self: Sized;

    /// Same as [`Lock::close`]. The backing file, if any, is left in place.
    fn delete(self) -> Result<()>
    where
        Self: Sized,
    {
        self.close()
    }

    /// Run `f` while holding the lock, releasing it on every exit path.
    fn with_lock<T, F>(&self, f: F) -> Result<T>
    where
        Self: Sized,
        F: FnOnce() -> T,
    {
        let locked = self.lock()?;
        let value = f();
        locked.release()?;
        Ok(value)
    }
}
