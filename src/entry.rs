use std::time::SystemTime;

/// Metadata for a single path, as reported by a driver's
/// [`stat`](crate::traits::StorageDriver::stat).
///
/// The walker never builds one of these itself. Every `FileInfo` handed to a
/// visitor came straight out of a `stat` call, so a path that vanished between
/// `list` and `stat` never shows up here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Full registry path, e.g. `/docker/registry/v2/blobs`. Not relative to
    /// the walk root.
    pub path: String,

    /// Directories are descended into by the walker; files are not.
    pub is_dir: bool,

    /// Length in bytes. Only meaningful for files; drivers report `0` for
    /// directories.
    pub size: u64,

    /// Last modification time, when the backend tracks one.
    pub mod_time: Option<SystemTime>,
}

impl FileInfo {
    /// Metadata for a regular file.
    pub fn file(path: impl Into<String>, size: u64) -> Self {
        Self {
            path:     path.into(),
            is_dir:   false,
            size,
            mod_time: None,
        }
    }

    /// Metadata for a directory.
    pub fn dir(path: impl Into<String>) -> Self {
        Self {
            path:     path.into(),
            is_dir:   true,
            size:     0,
            mod_time: None,
        }
    }

    /// Attach a modification time.
    pub fn with_mod_time(mut self, t: SystemTime) -> Self {
        self.mod_time = Some(t);
        self
    }

    /// The last path segment: `"data"` for `/blobs/sha256/ab/data`.
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

/// What a walk visitor wants the walker to do after seeing an entry.
///
/// Failures travel separately, as the `Err` side of the visitor's
/// `Result<Visit, StorageError>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visit {
    /// Keep going; descend if this entry is a directory.
    #[default]
    Continue,

    /// Prune. On a directory, skip its subtree and carry on with its
    /// siblings. On a file there is nothing to skip, so the walk stops.
    SkipDir,
}
