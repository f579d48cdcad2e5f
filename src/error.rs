use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    // Lookup
    #[error("path not found: {path} ({driver})")]
    PathNotFound { path: String, driver: String },

    #[error("invalid path: {path} ({driver})")]
    InvalidPath { path: String, driver: String },

    // Walk control
    #[error("walk stopped at {path}")]
    Pruned { path: String },

    #[error("context cancelled")]
    Cancelled,

    #[error("context deadline exceeded")]
    DeadlineExceeded,

    // Backend I/O
    #[error("IO error at {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{driver}: unsupported operation {operation}")]
    Unsupported { driver: String, operation: &'static str },

    // Config
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("unknown storage driver: {0}")]
    UnknownDriver(String),

    // Third-party extensibility
    #[error("driver error: {0}")]
    Driver(String),
}

impl StorageError {
    /// The registry path this error occurred at, if applicable.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::PathNotFound { path, .. }
            | Self::InvalidPath { path, .. }
            | Self::Pruned { path } => Some(path),
            _ => None,
        }
    }

    /// Whether the path simply did not exist when the backend looked.
    ///
    /// The walker treats this as a stale listing entry and skips it.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::PathNotFound { .. })
    }

    /// Whether this error is the surfaced form of a visitor's
    /// [`Visit::SkipDir`](crate::Visit::SkipDir).
    pub fn is_pruned(&self) -> bool {
        matches!(self, Self::Pruned { .. })
    }

    pub(crate) fn not_found(path: &str, driver: &str) -> Self {
        Self::PathNotFound {
            path:   path.to_string(),
            driver: driver.to_string(),
        }
    }

    pub(crate) fn invalid_path(path: &str, driver: &str) -> Self {
        Self::InvalidPath {
            path:   path.to_string(),
            driver: driver.to_string(),
        }
    }
}
