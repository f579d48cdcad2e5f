use crate::context::Context;
use crate::engine::{self, WalkOptions};
use crate::entry::{FileInfo, Visit};
use crate::error::StorageError;

/// Callback invoked by a walk for each entry it reaches.
///
/// Return `Ok(Visit::Continue)` to keep going, `Ok(Visit::SkipDir)` to prune,
/// or `Err` to abort the walk with that error.
pub type WalkFn<'a> = dyn FnMut(&FileInfo) -> Result<Visit, StorageError> + 'a;

/// A pluggable storage backend: local filesystem, object store, in-memory,
/// or a test double.
///
/// Paths are slash-delimited registry paths (see [`crate::path`]). Every
/// method takes a [`Context`] first and must fail fast with the context's
/// error once it is cancelled or past its deadline.
///
/// # Object Safety
///
/// `StorageDriver` is object-safe. [`DriverBuilder`](crate::DriverBuilder)
/// hands drivers out as `Box<dyn StorageDriver>`, so the walk methods take the
/// visitor as `&mut WalkFn` rather than a generic closure.
///
/// # Consistency
///
/// Backends may be eventually consistent: a path returned by
/// [`list`](StorageDriver::list) may already be gone when
/// [`stat`](StorageDriver::stat) is called. Report that as
/// [`StorageError::PathNotFound`]; the walker treats it as a stale entry, not
/// a failure.
///
/// # Example
///
/// ```rust
/// use registry_storage::{Context, InMemoryDriver, StorageDriver, Visit};
///
/// let ctx = Context::background();
/// let driver = InMemoryDriver::new();
/// driver.put_content(&ctx, "/repositories/library/alpine/_layers/link", b"sha256:ab").unwrap();
///
/// let mut seen = Vec::new();
/// driver
///     .walk_files(&ctx, "/", &Default::default(), &mut |fi| {
///         seen.push(fi.path.clone());
///         Ok(Visit::Continue)
///     })
///     .unwrap();
///
/// assert_eq!(seen, ["/repositories/library/alpine/_layers/link"]);
/// ```
pub trait StorageDriver: Send + Sync {
    /// Short human-readable driver name, used in error messages.
    fn name(&self) -> &str;

    /// Read the whole content stored at `path`.
    fn get_content(&self, ctx: &Context, path: &str) -> Result<Vec<u8>, StorageError>;

    /// Store `content` at `path`, replacing anything already there.
    fn put_content(&self, ctx: &Context, path: &str, content: &[u8]) -> Result<(), StorageError>;

    /// Metadata for `path`, or [`StorageError::PathNotFound`].
    fn stat(&self, ctx: &Context, path: &str) -> Result<FileInfo, StorageError>;

    /// Full paths of the immediate children of `path`.
    ///
    /// An empty directory or an unknown path yields an empty list, not an
    /// error.
    fn list(&self, ctx: &Context, path: &str) -> Result<Vec<String>, StorageError>;

    /// Move the object at `source` to `dest`, overwriting `dest`.
    fn move_path(&self, ctx: &Context, source: &str, dest: &str) -> Result<(), StorageError>;

    /// Delete `path` and, for a directory, everything beneath it.
    fn delete(&self, ctx: &Context, path: &str) -> Result<(), StorageError>;

    /// Depth-first, pre-order traversal of everything beneath `from`.
    ///
    /// Backends that can enumerate their tree natively may override this.
    /// The default is the [`engine::walk_fallback_with`] engine built on
    /// `list` and `stat`.
    fn walk(
        &self,
        ctx: &Context,
        from: &str,
        options: &WalkOptions,
        visit: &mut WalkFn<'_>,
    ) -> Result<(), StorageError> {
        engine::walk_fallback_with(ctx, self, from, options, visit)
    }

    /// Like [`walk`](StorageDriver::walk) but only files reach `visit`.
    fn walk_files(
        &self,
        ctx: &Context,
        from: &str,
        options: &WalkOptions,
        visit: &mut WalkFn<'_>,
    ) -> Result<(), StorageError> {
        engine::walk_files_fallback_with(ctx, self, from, options, visit)
    }
}
