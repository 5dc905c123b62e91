//! Acquisition tokens.

use super::Unlock;
use crate::error::Result;
use std::fmt;
use tracing::warn;

/// RAII token for a held lock.
///
/// When dropped, the lock is released. If release fails during drop, a
/// warning is logged but no panic occurs.
///
/// Tokens are only issued by [`Lock`](super::Lock) implementations in this
/// crate and cannot be built by hand:
///
/// ```compile_fail
/// use advlock::{Locked, MemoryLock};
///
/// let lock = MemoryLock::new("cache");
/// let _token = Locked::new(&lock);
/// ```
///
/// The release hook behind a token is not reachable from outside either:
///
/// ```compile_fail
/// use advlock::locks::Unlock;
/// ```
#[must_use = "the lock is released as soon as the token is dropped"]
pub struct Locked<'a> {
    /// Backend that issued this token.
    lock: &'a dyn Unlock,

    /// Whether the lock has been released manually.
    released: bool,
}

impl<'a> Locked<'a> {
    /// Wrap a lock that `lock` has just acquired.
    pub(super) fn new(lock: &'a dyn Unlock) -> Self {
        Self {
            lock,
            released: false,
        }
    }

    /// Manually release the lock.
    ///
    /// Use this instead of dropping the token when the release error matters.
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        self.lock.unlock()
    }
}

impl Drop for Locked<'_> {
    fn drop(&mut self) {
        if !self.released
            && let Err(e) = self.lock.unlock()
        {
            warn!("failed to release lock on drop: {}", e);
        }
    }
}

impl fmt::Debug for Locked<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Locked")
            .field("released", &self.released)
            .finish_non_exhaustive()
    }
}

/// Outcome of a non-blocking acquisition attempt.
#[derive(Debug)]
#[must_use = "an acquired lock is released as soon as the token is dropped"]
pub enum TryLocked<'a> {
    /// The lock was acquired and is held until the token is released.
    Acquired(Locked<'a>),
    /// The lock is held elsewhere, by another process or by this one.
    NotAcquired,
}

impl<'a> TryLocked<'a> {
    /// Whether the attempt acquired the lock.
    pub fn is_locked(&self) -> bool {
        matches!(self, TryLocked::Acquired(_))
    }

    /// Release the lock if it was acquired. A no-op for `NotAcquired`.
    pub fn release(self) -> Result<()> {
        match self {
            TryLocked::Acquired(locked) => locked.release(),
            TryLocked::NotAcquired => Ok(()),
        }
    }

    /// Convert into the held token, if any.
    pub fn into_locked(self) -> Option<Locked<'a>> {
        match self {
            TryLocked::Acquired(locked) => Some(locked),
            TryLocked::NotAcquired => None,
        }
    }
}
