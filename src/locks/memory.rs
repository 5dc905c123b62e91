//! In-process lock with the same contract as [`FileLock`](super::FileLock).

use super::guard::{Locked, TryLocked};
use super::{Lock, Unlock};
use crate::error::{LockError, Result};
use std::path::PathBuf;
use std::sync::{Condvar, Mutex, MutexGuard};
use std::thread::{self, ThreadId};
use tracing::{debug, trace};

/// A lock that only excludes threads of the current process.
///
/// Other threads play the role other processes play for a `FileLock`: they
/// block in `lock` and see `NotAcquired` from `try_lock`. The holding thread
/// gets `HeldInProcess` from `lock` rather than deadlocking.
#[derive(Debug)]
pub struct MemoryLock {
    name: String,
    owner: Mutex<Option<ThreadId>>,
    freed: Condvar,
}

impl MemoryLock {
    /// Create a free lock identified by `name` in errors and logs.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            owner: Mutex::new(None),
            freed: Condvar::new(),
        }
    }

    /// Name given at construction.
    pub fn name(&self) -> &str {
        &self.name
    }

    fn state(&self) -> MutexGuard<'_, Option<ThreadId>> {
        self.owner.lock().unwrap_or_else(|poison| poison.into_inner())
    }
}

impl Default for MemoryLock {
    fn default() -> Self {
        Self::new("memory")
    }
}

impl Lock for MemoryLock {
    fn lock(&self) -> Result<Locked<'_>> {
        let current = thread::current().id();
        let mut owner = self.state();
        loop {
            let holder = *owner;
            match holder {
                None => break,
                Some(id) if id == current => {
                    return Err(LockError::HeldInProcess {
                        path: PathBuf::from(&self.name),
                    });
                }
                Some(_) => {
                    owner = self
                        .freed
                        .wait(owner)
                        .unwrap_or_else(|poison| poison.into_inner());
                }
            }
        }
        *owner = Some(current);
        debug!("acquired memory lock: {}", self.name);
        Ok(Locked::new(self))
    }

    fn try_lock(&self) -> Result<TryLocked<'_>> {
        let mut owner = self.state();
        if owner.is_some() {
            trace!("memory lock busy: {}", self.name);
            return Ok(TryLocked::NotAcquired);
        }
        *owner = Some(thread::current().id());
        debug!("acquired memory lock: {}", self.name);
        Ok(TryLocked::Acquired(Locked::new(self)))
    }

    fn close(self) -> Result<()> {
        Ok(())
    }
}

impl Unlock for MemoryLock {
    fn unlock(&self) -> Result<()> {
        *self.state() = None;
        self.freed.notify_one();
        debug!("released memory lock: {}", self.name);
        Ok(())
    }
}
