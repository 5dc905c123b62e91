//! advlock: cross-process mutual exclusion through OS advisory locks on a file.
//!
//! ```no_run
//! use advlock::{FileLock, Lock};
//!
//! let lock = FileLock::open("/tmp/build-cache.lock")?;
//! let locked = lock.lock()?;
//! // protected work
//! locked.release()?;
//! lock.close()?;
//! # Ok::<(), advlock::LockError>(())
//! ```

pub mod error;
pub mod exit_codes;
pub mod locks;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{LockError, Result};
pub use locks::{FileLock, FileLockOptions, Lock, Locked, MemoryLock, TryLocked};
