//! Registry path rules shared by every driver.
//!
//! A valid path is either `/` or one or more `/segment` components, where a
//! segment is a non-empty run of `[A-Za-z0-9._-]`. No trailing slash, no
//! empty segments.

use crate::error::StorageError;

/// Whether `path` is a well-formed registry path.
pub fn is_valid(path: &str) -> bool {
    if path == "/" {
        return true;
    }
    let Some(rest) = path.strip_prefix('/') else {
        return false;
    };
    rest.split('/').all(|seg| {
        !seg.is_empty()
            && seg
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-'))
    })
}

/// Return `Err(InvalidPath)` unless `path` is well-formed.
pub fn validate(path: &str, driver: &str) -> Result<(), StorageError> {
    if is_valid(path) {
        Ok(())
    } else {
        Err(StorageError::invalid_path(path, driver))
    }
}

/// Join a child name onto a registry path.
pub fn join(parent: &str, name: &str) -> String {
    if parent == "/" {
        format!("/{name}")
    } else {
        format!("{parent}/{name}")
    }
}

/// The parent of a registry path; `None` for `/`.
pub fn parent(path: &str) -> Option<&str> {
    if path == "/" {
        return None;
    }
    match path.rfind('/') {
        Some(0)   => Some("/"),
        Some(idx) => Some(&path[..idx]),
        None      => None,
    }
}

/// Whether `path` lies strictly beneath `dir`.
pub fn is_descendant(path: &str, dir: &str) -> bool {
    if dir == "/" {
        return path.len() > 1 && path.starts_with('/');
    }
    path.len() > dir.len() && path.starts_with(dir) && path.as_bytes()[dir.len()] == b'/'
}
