//! The fallback walk engine.
//!
//! Reconstructs an ordered, depth-first, pre-order traversal from nothing but
//! a driver's flat [`list`](StorageDriver::list) and
//! [`stat`](StorageDriver::stat) primitives. Every driver gets this for free
//! through the default [`StorageDriver::walk`] and
//! [`StorageDriver::walk_files`] methods.
//!
//! The walk is sequential. Each listing is sorted before it is walked, each directory is announced before its subtree, and
//! nothing is cached between calls: every level is listed exactly once, at
//! the moment the walk reaches it.

use tracing::{debug, trace};

use crate::context::Context;
use crate::entry::{FileInfo, Visit};
use crate::error::StorageError;
use crate::path;
use crate::traits::{StorageDriver, WalkFn};

// ---------------------------------------------------------------------------
// WalkOptions
// ---------------------------------------------------------------------------

/// Optional walk parameters. The default walks everything.
///
/// # Example
///
/// ```rust
/// use registry_storage::engine::WalkOptions;
///
/// // Resume a paginated catalog walk after the last repository returned.
/// let opts = WalkOptions::new().start_after("/repositories/library/alpine");
/// assert_eq!(opts.start_after_hint(), Some("/repositories/library/alpine"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct WalkOptions {
    start_after: Option<String>,
}

impl WalkOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip every child that sorts at or before `hint`, except directories
    /// that contain `hint`, which are still entered so the walk can reach
    /// the entries after it.
    ///
    /// Skipped children are never `stat`ed. Comparison is plain byte order.
    pub fn start_after(mut self, hint: impl Into<String>) -> Self {
        let hint = hint.into();
        self.start_after = if hint.is_empty() { None } else { Some(hint) };
        self
    }

    pub fn start_after_hint(&self) -> Option<&str> {
        self.start_after.as_deref()
    }

    fn skips(&self, child: &str) -> bool {
        match self.start_after.as_deref() {
            Some(hint) => child <= hint && !path::is_descendant(hint, child),
            None       => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

/// Walk everything beneath `from`, files and directories, in pre-order.
///
/// `from` itself is never visited. Siblings are visited in sorted order. Returning [`Visit::SkipDir`] for a
/// directory skips its subtree; returning it for a file ends the whole walk,
/// and this function still reports `Ok(())`. Any `Err` from the visitor or
/// the driver ends the walk and is returned unchanged.
pub fn walk_fallback<D, F>(ctx: &Context, driver: &D, from: &str, visit: F) -> Result<(), StorageError>
where
    D: StorageDriver + ?Sized,
    F: FnMut(&FileInfo) -> Result<Visit, StorageError>,
{
    walk_fallback_with(ctx, driver, from, &WalkOptions::default(), visit)
}

/// [`walk_fallback`] with explicit [`WalkOptions`].
pub fn walk_fallback_with<D, F>(
    ctx: &Context,
    driver: &D,
    from: &str,
    options: &WalkOptions,
    mut visit: F,
) -> Result<(), StorageError>
where
    D: StorageDriver + ?Sized,
    F: FnMut(&FileInfo) -> Result<Visit, StorageError>,
{
    debug!(driver = driver.name(), from, "walk started");
    match walk_dir(ctx, driver, from, options, false, &mut visit)? {
        Flow::Continue => debug!(driver = driver.name(), from, "walk finished"),
        Flow::Stop(at) => debug!(driver = driver.name(), from, at = %at, "walk stopped early"),
    }
    Ok(())
}

/// Walk only the files beneath `from`, in pre-order.
///
/// Directories are still listed and descended into, but never handed to
/// `visit`. Because only files reach the visitor, [`Visit::SkipDir`] always
/// ends the walk, and unlike [`walk_fallback`] it is reported to the caller
/// as [`StorageError::Pruned`].
///
/// The two entry points disagree here for compatibility with existing
/// callers. Treat `Pruned` as success if all you wanted was an early exit.
pub fn walk_files_fallback<D, F>(ctx: &Context, driver: &D, from: &str, visit: F) -> Result<(), StorageError>
where
    D: StorageDriver + ?Sized,
    F: FnMut(&FileInfo) -> Result<Visit, StorageError>,
{
    walk_files_fallback_with(ctx, driver, from, &WalkOptions::default(), visit)
}

/// [`walk_files_fallback`] with explicit [`WalkOptions`].
pub fn walk_files_fallback_with<D, F>(
    ctx: &Context,
    driver: &D,
    from: &str,
    options: &WalkOptions,
    mut visit: F,
) -> Result<(), StorageError>
where
    D: StorageDriver + ?Sized,
    F: FnMut(&FileInfo) -> Result<Visit, StorageError>,
{
    debug!(driver = driver.name(), from, "file walk started");
    match walk_dir(ctx, driver, from, options, true, &mut visit)? {
        Flow::Continue => {
            debug!(driver = driver.name(), from, "file walk finished");
            Ok(())
        }
        Flow::Stop(path) => Err(StorageError::Pruned { path }),
    }
}

// ---------------------------------------------------------------------------
// Recursive core
// ---------------------------------------------------------------------------

/// How a level finished, when it did not fail.
enum Flow {
    /// Every child was handled.
    Continue,

    /// A file asked to prune; unwind without touching anything else.
    /// Carries the file's path.
    Stop(String),
}

fn walk_dir<D>(
    ctx: &Context,
    driver: &D,
    dir: &str,
    options: &WalkOptions,
    files_only: bool,
    visit: &mut WalkFn<'_>,
) -> Result<Flow, StorageError>
where
    D: StorageDriver + ?Sized,
{
    ctx.check()?;
    let mut children = driver.list(ctx, dir)?;
    // Drivers owe no particular order; siblings are walked in byte order.
    children.sort();

    for child in children {
        if options.skips(&child) {
            continue;
        }

        ctx.check()?;
        let info = match driver.stat(ctx, &child) {
            Ok(info) => info,
            // Listed but already gone: a concurrent delete, or an
            // eventually consistent backend lagging behind its listing.
            Err(e) if e.is_not_found() => {
                trace!(path = %child, "listed path vanished before stat; skipping");
                continue;
            }
            Err(e) => return Err(e),
        };

        let verdict = if files_only && info.is_dir {
            Visit::Continue
        } else {
            visit(&info)?
        };

        match (verdict, info.is_dir) {
            (Visit::Continue, true) => {
                if let Flow::Stop(at) = walk_dir(ctx, driver, &info.path, options, files_only, visit)? {
                    return Ok(Flow::Stop(at));
                }
            }
            (Visit::Continue, false) => {}
            (Visit::SkipDir, true) => {
                debug!(path = %info.path, "pruned directory");
            }
            (Visit::SkipDir, false) => return Ok(Flow::Stop(info.path)),
        }
    }

    Ok(Flow::Continue)
}
