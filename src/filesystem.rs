use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use tracing::warn;

use crate::context::Context;
use crate::entry::FileInfo;
use crate::error::StorageError;
use crate::path;
use crate::traits::StorageDriver;

const DRIVER_NAME: &str = "filesystem";

/// Storage driver backed by a directory on the local filesystem.
///
/// Registry path `/a/b` maps to `<root>/a/b`. Listings are sorted by file
/// name. Child names that are not valid registry path segments (spaces,
/// non-ASCII, ...) are left out of listings, since nothing could address them.
///
/// Symlinks are never followed by `stat`: a link is reported as a file of the
/// link's own size, so a link pointing back at an ancestor cannot make a walk
/// recurse forever.
#[derive(Debug, Clone)]
pub struct FilesystemDriver {
    root: PathBuf,
}

impl FilesystemDriver {
    /// A driver rooted at `root`. The directory is created lazily by the
    /// first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn full_path(&self, p: &str) -> PathBuf {
        self.root.join(p.trim_start_matches('/'))
    }

    fn prepare(&self, ctx: &Context, p: &str) -> Result<PathBuf, StorageError> {
        ctx.check()?;
        path::validate(p, DRIVER_NAME)?;
        Ok(self.full_path(p))
    }
}

/// Map an I/O error on `full`, which backs registry path `p`.
fn map_io_error(p: &str, full: PathBuf, e: io::Error) -> StorageError {
    if e.kind() == io::ErrorKind::NotFound {
        StorageError::not_found(p, DRIVER_NAME)
    } else {
        StorageError::Io { path: full, source: e }
    }
}

fn map_ignore_error(full: &Path, e: ignore::Error) -> StorageError {
    match e {
        ignore::Error::WithPath { path, err } => match *err {
            ignore::Error::Io(source) => StorageError::Io { path, source },
            other => StorageError::Driver(format!("{DRIVER_NAME}: {}: {other}", path.display())),
        },
        ignore::Error::Io(source) => StorageError::Io {
            path: full.to_path_buf(),
            source,
        },
        other => StorageError::Driver(format!("{DRIVER_NAME}: {other}")),
    }
}

impl StorageDriver for FilesystemDriver {
    fn name(&self) -> &str {
        DRIVER_NAME
    }

    fn get_content(&self, ctx: &Context, p: &str) -> Result<Vec<u8>, StorageError> {
        let full = self.prepare(ctx, p)?;
        fs::read(&full).map_err(|e| map_io_error(p, full, e))
    }

    fn put_content(&self, ctx: &Context, p: &str, content: &[u8]) -> Result<(), StorageError> {
        let full = self.prepare(ctx, p)?;
        if p == "/" {
            return Err(StorageError::invalid_path(p, DRIVER_NAME));
        }
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).map_err(|e| StorageError::Io {
                path:   parent.to_path_buf(),
                source: e,
            })?;
        }
        fs::write(&full, content).map_err(|e| map_io_error(p, full, e))
    }

    fn stat(&self, ctx: &Context, p: &str) -> Result<FileInfo, StorageError> {
        let full = self.prepare(ctx, p)?;
        let meta = match fs::symlink_metadata(&full) {
            Ok(m) => m,
            Err(e) => return Err(map_io_error(p, full, e)),
        };
        let info = if meta.file_type().is_dir() {
            FileInfo::dir(p)
        } else {
            FileInfo::file(p, meta.len())
        };
        Ok(match meta.modified() {
            Ok(t) => info.with_mod_time(t),
            Err(_) => info,
        })
    }

    fn list(&self, ctx: &Context, p: &str) -> Result<Vec<String>, StorageError> {
        let full = self.prepare(ctx, p)?;

        let walker = WalkBuilder::new(&full)
            .standard_filters(false)
            .ignore(false)
            .parents(false)
            .hidden(false)
            .follow_links(false)
            .max_depth(Some(1))
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();

        let mut children = Vec::new();
        for res in walker {
            let entry = match res {
                Ok(e) => e,
                // Missing directory lists as empty; a child removed mid-read
                // is simply not there.
                Err(e) if e.io_error().map(io::Error::kind) == Some(io::ErrorKind::NotFound) => continue,
                Err(e) => return Err(map_ignore_error(&full, e)),
            };

            // Skip the directory itself
            if entry.depth() == 0 {
                continue;
            }

            let name = entry.file_name().to_string_lossy();
            let child = path::join(p, &name);
            if !path::is_valid(&child) {
                warn!(path = %entry.path().display(), "skipping entry with unaddressable name");
                continue;
            }
            children.push(child);
        }
        Ok(children)
    }

    fn move_path(&self, ctx: &Context, source: &str, dest: &str) -> Result<(), StorageError> {
        let from = self.prepare(ctx, source)?;
        path::validate(dest, DRIVER_NAME)?;
        let to = self.full_path(dest);

        if let Err(e) = fs::metadata(&from) {
            return Err(map_io_error(source, from, e));
        }
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent).map_err(|e| StorageError::Io {
                path:   parent.to_path_buf(),
                source: e,
            })?;
        }
        fs::rename(&from, &to).map_err(|e| map_io_error(source, from, e))
    }

    fn delete(&self, ctx: &Context, p: &str) -> Result<(), StorageError> {
        let full = self.prepare(ctx, p)?;
        let meta = match fs::symlink_metadata(&full) {
            Ok(m) => m,
            Err(e) => return Err(map_io_error(p, full, e)),
        };
        let res = if meta.is_dir() {
            fs::remove_dir_all(&full)
        } else {
            fs::remove_file(&full)
        };
        res.map_err(|e| map_io_error(p, full, e))
    }
}
