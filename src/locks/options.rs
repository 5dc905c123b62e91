//! Options for opening a file lock.

use serde::{Deserialize, Serialize};

/// Settings applied when a [`FileLock`](super::FileLock) opens its file.
///
/// Unknown fields are ignored so the struct can be embedded in a larger
/// application config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLockOptions {
    /// Create missing parent directories before opening (default: false).
    pub create_parent_dirs: bool,
}

impl FileLockOptions {
    /// Create options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable creation of parent directories.
    pub fn with_create_parent_dirs(mut self, create: bool) -> Self {
        self.create_parent_dirs = create;
        self
    }
}
