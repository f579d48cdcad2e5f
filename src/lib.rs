//! # registry-storage
//!
//! Storage drivers for a container-image registry, and the walk engine every
//! higher-level feature (blob garbage collection, catalog listing, manifest
//! enumeration) leans on.
//!
//! A driver exposes a handful of flat primitives over slash-delimited paths
//! ([`StorageDriver`]). Few backends can enumerate a tree natively, so
//! [`engine`] rebuilds an ordered, depth-first, pre-order traversal out of
//! `list` and `stat` alone. It tolerates eventually consistent backends: a
//! path that was listed but is gone by the time it is `stat`ed is skipped,
//! not reported.
//!
//! # Quick Start
//!
//! ```rust
//! use registry_storage::{Context, StorageDriver, Visit};
//!
//! let ctx = Context::background();
//! let driver = registry_storage::driver("inmemory").build().unwrap();
//!
//! driver.put_content(&ctx, "/blobs/sha256/ab/data", b"layer").unwrap();
//! driver.put_content(&ctx, "/repositories/alpine/_manifests/tags/latest/link", b"sha256:ab").unwrap();
//!
//! // Walk everything, but stay out of the repositories tree.
//! let mut seen = Vec::new();
//! registry_storage::walk_fallback(&ctx, driver.as_ref(), "/", |fi| {
//!     seen.push(fi.path.clone());
//!     if fi.path == "/repositories" {
//!         return Ok(Visit::SkipDir);
//!     }
//!     Ok(Visit::Continue)
//! })
//! .unwrap();
//!
//! assert_eq!(seen, [
//!     "/blobs",
//!     "/blobs/sha256",
//!     "/blobs/sha256/ab",
//!     "/blobs/sha256/ab/data",
//!     "/repositories",
//! ]);
//! ```
//!
//! # Pruning and stopping
//!
//! A visitor returns [`Visit::SkipDir`] to prune. On a directory the subtree
//! is skipped and the walk carries on with the next sibling. On a file there
//! is nothing to skip, so the whole walk stops:
//! [`walk_fallback`] then reports `Ok(())`, while [`walk_files_fallback`]
//! reports [`StorageError::Pruned`]. Any `Err` a visitor returns stops the
//! walk and comes back to the caller unchanged.

#![forbid(unsafe_code)]

pub mod engine;
pub mod path;

mod builder;
mod context;
mod entry;
mod error;
mod filesystem;
mod inmemory;
mod traits;

// ── Public re-exports ─────────────────────────────────────────────────────────

pub use builder::DriverBuilder;
pub use context::Context;
pub use engine::{
    walk_fallback, walk_fallback_with, walk_files_fallback, walk_files_fallback_with, WalkOptions,
};
pub use entry::{FileInfo, Visit};
pub use error::StorageError;
pub use filesystem::FilesystemDriver;
pub use inmemory::InMemoryDriver;
pub use traits::{StorageDriver, WalkFn};

// ── Entry point ───────────────────────────────────────────────────────────────

/// Create a [`DriverBuilder`] for the driver called `name`.
///
/// # Example
///
/// ```rust
/// use registry_storage::StorageDriver;
///
/// let driver = registry_storage::driver("inmemory").build().unwrap();
/// assert_eq!(driver.name(), "inmemory");
///
/// let err = registry_storage::driver("filesystem").build().err().unwrap();
/// assert!(matches!(err, registry_storage::StorageError::InvalidParameter { .. }));
/// ```
pub fn driver(name: impl Into<String>) -> DriverBuilder {
    DriverBuilder::new(name)
}
