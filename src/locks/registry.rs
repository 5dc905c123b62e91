//! Process-wide table of held lock files.
//!
//! Maps the identity of each locked file to the `FileLock` instance holding
//! it. The mutex is only held for table updates, never across a blocking lock
//! syscall.

use std::collections::HashMap;
use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{LazyLock, Mutex, MutexGuard};

/// Identity of an open file, independent of the path used to reach it.
///
/// On Unix this is the device and inode of the open handle, so hard links and
/// bind mounts of one file share a key while a recreated file gets a new one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(super) enum FileKey {
    #[cfg(unix)]
    Inode { dev: u64, ino: u64 },
    #[cfg(not(unix))]
    Path(std::path::PathBuf),
}

impl FileKey {
    #[cfg(unix)]
    pub(super) fn of(file: &File, _path: &Path) -> io::Result<Self> {
        use std::os::unix::fs::MetadataExt as _;

        let metadata = file.metadata()?;
        Ok(FileKey::Inode {
            dev: metadata.dev(),
            ino: metadata.ino(),
        })
    }

    #[cfg(not(unix))]
    pub(super) fn of(_file: &File, path: &Path) -> io::Result<Self> {
        std::fs::canonicalize(path).map(FileKey::Path)
    }
}

static HELD: LazyLock<Mutex<HashMap<FileKey, u64>>> = LazyLock::new(|| Mutex::new(HashMap::new()));

static NEXT_OWNER: AtomicU64 = AtomicU64::new(1);

fn table() -> MutexGuard<'static, HashMap<FileKey, u64>> {
    // Entries stay consistent even if a holder panicked mid-update.
    HELD.lock().unwrap_or_else(|poison| poison.into_inner())
}

/// Allocate a unique owner id for a new lock instance.
pub(super) fn next_owner() -> u64 {
    NEXT_OWNER.fetch_add(1, Ordering::Relaxed)
}

/// Record `owner` as holding `key`. Returns false if any owner already holds it.
pub(super) fn claim(key: &FileKey, owner: u64) -> bool {
    let mut held = table();
    if held.contains_key(key) {
        return false;
    }
    held.insert(key.clone(), owner);
    true
}

/// Forget the entry for `key` if it belongs to `owner`.
pub(super) fn release(key: &FileKey, owner: u64) {
    let mut held = table();
    if held.get(key) == Some(&owner) {
        held.remove(key);
    }
}

/// Whether `owner` currently holds `key`.
pub(super) fn is_held_by(key: &FileKey, owner: u64) -> bool {
    table().get(key) == Some(&owner)
}
