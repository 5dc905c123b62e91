use std::path::PathBuf;
use tempfile::TempDir;

/// A fresh temporary directory and a lock path inside it that does not exist yet.
pub(crate) fn temp_lock_path(name: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join(name);
    (temp_dir, path)
}
