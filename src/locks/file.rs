//! File-backed advisory lock.

use super::guard::{Locked, TryLocked};
use super::options::FileLockOptions;
use super::registry::{self, FileKey};
use super::{Lock, Unlock};
use crate::error::{LockError, Result};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

/// An exclusive OS advisory lock anchored to a file.
///
/// The file is opened read/write (created if absent) when the lock is opened
/// and stays open until [`Lock::close`] or drop. Its contents are never read,
/// written, or truncated, and the file is never deleted.
#[derive(Debug)]
pub struct FileLock {
    /// Open handle the OS lock is taken on.
    file: File,

    /// Path as supplied by the caller.
    path: PathBuf,

    /// Identity of the open file, used as the key in the process-wide table.
    key: FileKey,

    /// Identity of this instance in the process-wide table.
    owner: u64,
}

impl FileLock {
    /// Open a lock file with default options.
    ///
    /// # Returns
    ///
    /// * `Ok(FileLock)` - The file exists and is open for read/write
    /// * `Err(LockError::Open)` - The path cannot be opened (permissions,
    ///   missing parent, path is a directory)
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, &FileLockOptions::default())
    }

    /// Open a lock file with the given options.
    pub fn open_with<P: AsRef<Path>>(path: P, options: &FileLockOptions) -> Result<Self> {
        let path = path.as_ref();
        let open_error = |source| LockError::Open {
            path: path.to_path_buf(),
            source,
        };

        if options.create_parent_dirs
            && let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(open_error)?;
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(open_error)?;

        let key = FileKey::of(&file, path).map_err(open_error)?;
        debug!("opened lock file: {}", path.display());

        Ok(Self {
            file,
            path: path.to_path_buf(),
            key,
            owner: registry::next_owner(),
        })
    }

    /// Get the path to the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Unlock if a token was leaked while still holding the lock.
    fn release_leaked(&self) -> Result<()> {
        if !registry::is_held_by(&self.key, self.owner) {
            return Ok(());
        }
        let result = FileExt::unlock(&self.file).map_err(|source| LockError::Close {
            path: self.path.clone(),
            source,
        });
        registry::release(&self.key, self.owner);
        result
    }
}

/// Whether a non-blocking lock attempt failed because someone else holds the lock.
fn is_contended(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::WouldBlock
        || err.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

impl Lock for FileLock {
    fn lock(&self) -> Result<Locked<'_>> {
        if !registry::claim(&self.key, self.owner) {
            return Err(LockError::HeldInProcess {
                path: self.path.clone(),
            });
        }

        if let Err(source) = self.file.lock_exclusive() {
            registry::release(&self.key, self.owner);
            return Err(LockError::Acquire {
                path: self.path.clone(),
                source,
            });
        }

        debug!("acquired lock: {}", self.path.display());
        Ok(Locked::new(self))
    }

    fn try_lock(&self) -> Result<TryLocked<'_>> {
        if !registry::claim(&self.key, self.owner) {
            trace!("lock already held by this process: {}", self.path.display());
            return Ok(TryLocked::NotAcquired);
        }

        match self.file.try_lock_exclusive() {
            Ok(()) => {
                debug!("acquired lock: {}", self.path.display());
                Ok(TryLocked::Acquired(Locked::new(self)))
            }
            Err(e) if is_contended(&e) => {
                registry::release(&self.key, self.owner);
                trace!("lock held by another process: {}", self.path.display());
                Ok(TryLocked::NotAcquired)
            }
            Err(source) => {
                registry::release(&self.key, self.owner);
                Err(LockError::Acquire {
                    path: self.path.clone(),
                    source,
                })
            }
        }
    }

    /// Closes the handle, unlocking first if a leaked token still holds it.
    ///
    /// Only an unlock failure is reported. The OS close of the handle itself
    /// cannot report errors through `std::fs::File`, so a failure there is
    /// not observable.
    fn close(self) -> Result<()> {
        let result = self.release_leaked();
        debug!("closed lock file: {}", self.path.display());
        drop(self);
        result
    }
}

impl Unlock for FileLock {
    fn unlock(&self) -> Result<()> {
        // Table entry is dropped even if the OS unlock fails.
        let result = FileExt::unlock(&self.file).map_err(|source| LockError::Release {
            path: self.path.clone(),
            source,
        });
        registry::release(&self.key, self.owner);
        debug!("released lock: {}", self.path.display());
        result
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        if let Err(e) = self.release_leaked() {
            warn!("{}", e);
        }
    }
}
