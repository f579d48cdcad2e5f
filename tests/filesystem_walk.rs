use std::fs;
use std::path::Path;

use registry_storage::{
    walk_fallback, walk_files_fallback, Context, FilesystemDriver, StorageError, Visit,
};

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

/// Create a temporary registry root for testing.
///
/// Structure:
/// ```text
/// tmp/
///   blobs/
///     sha256/
///       0a/0a1b/data
///       ff/ff00/data
///   repositories/
///     library/
///       alpine/_layers/sha256/0a1b/link
///       busybox/_uploads/
///   README.md
/// ```
fn setup_test_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    for (path, content) in [
        ("blobs/sha256/0a/0a1b/data", "layer"),
        ("blobs/sha256/ff/ff00/data", "config"),
        ("repositories/library/alpine/_layers/sha256/0a1b/link", "sha256:0a1b"),
        ("README.md", "notes"),
    ] {
        let full = root.join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, content).unwrap();
    }
    fs::create_dir_all(root.join("repositories/library/busybox/_uploads")).unwrap();

    dir
}

/// Pre-order listing of everything under `root` as registry paths, produced
/// independently by `walkdir`.
fn walkdir_oracle(root: &Path, files_only: bool) -> Vec<String> {
    walkdir::WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .map(|e| e.unwrap())
        .filter(|e| !files_only || e.file_type().is_file())
        .map(|e| {
            let rel = e.path().strip_prefix(root).unwrap();
            format!("/{}", rel.to_string_lossy().replace('\\', "/"))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn walk_matches_walkdir_pre_order() {
    let dir = setup_test_dir();
    let d = FilesystemDriver::new(dir.path());

    let mut walked = Vec::new();
    walk_fallback(&Context::background(), &d, "/", |fi| {
        walked.push(fi.path.clone());
        Ok(Visit::Continue)
    })
    .unwrap();

    assert_eq!(walked, walkdir_oracle(dir.path(), false));
}

#[test]
fn walk_files_matches_walkdir_files() {
    let dir = setup_test_dir();
    let d = FilesystemDriver::new(dir.path());

    let mut walked = Vec::new();
    walk_files_fallback(&Context::background(), &d, "/", |fi| {
        assert!(!fi.is_dir);
        walked.push(fi.path.clone());
        Ok(Visit::Continue)
    })
    .unwrap();

    assert_eq!(walked, walkdir_oracle(dir.path(), true));
    assert_eq!(walked.len(), 4);
}

#[test]
fn walk_reports_sizes_from_stat() {
    let dir = setup_test_dir();
    let d = FilesystemDriver::new(dir.path());

    let mut sizes = Vec::new();
    walk_files_fallback(&Context::background(), &d, "/blobs", |fi| {
        sizes.push((fi.path.clone(), fi.size));
        Ok(Visit::Continue)
    })
    .unwrap();

    assert_eq!(
        sizes,
        [
            ("/blobs/sha256/0a/0a1b/data".to_string(), 5),
            ("/blobs/sha256/ff/ff00/data".to_string(), 6),
        ]
    );
}

#[test]
fn files_deleted_mid_walk_are_not_visited() {
    let dir = setup_test_dir();
    let d = FilesystemDriver::new(dir.path());
    let doomed = dir.path().join("blobs/sha256/ff/ff00/data");

    let mut walked = Vec::new();
    walk_fallback(&Context::background(), &d, "/blobs/sha256", |fi| {
        walked.push(fi.path.clone());
        // The listing of ff00 happens after this, so the file is simply gone.
        if fi.path == "/blobs/sha256/ff/ff00" {
            fs::remove_file(&doomed).unwrap();
        }
        Ok(Visit::Continue)
    })
    .unwrap();

    assert_eq!(
        walked,
        [
            "/blobs/sha256/0a",
            "/blobs/sha256/0a/0a1b",
            "/blobs/sha256/0a/0a1b/data",
            "/blobs/sha256/ff",
            "/blobs/sha256/ff/ff00",
        ]
    );
}

#[test]
fn catalog_walk_prunes_repository_internals() {
    let dir = setup_test_dir();
    let d = FilesystemDriver::new(dir.path());

    // Repositories are the directories holding _layers/_uploads/_manifests;
    // never descend into those.
    let mut repos = Vec::new();
    walk_fallback(&Context::background(), &d, "/repositories", |fi| {
        if fi.is_dir && fi.name().starts_with('_') {
            if let Some(repo) = registry_storage::path::parent(&fi.path) {
                repos.push(repo.trim_start_matches("/repositories/").to_string());
            }
            return Ok(Visit::SkipDir);
        }
        Ok(Visit::Continue)
    })
    .unwrap();

    assert_eq!(repos, ["library/alpine", "library/busybox"]);
}

#[cfg(unix)]
#[test]
fn symlink_to_ancestor_is_reported_as_file() {
    let dir = setup_test_dir();
    std::os::unix::fs::symlink(
        dir.path().join("blobs"),
        dir.path().join("blobs/sha256/loop"),
    )
    .unwrap();
    let d = FilesystemDriver::new(dir.path());

    let mut walked = Vec::new();
    walk_fallback(&Context::background(), &d, "/blobs", |fi| {
        walked.push((fi.path.clone(), fi.is_dir));
        Ok(Visit::Continue)
    })
    .unwrap();

    assert!(walked.contains(&("/blobs/sha256/loop".to_string(), false)));
    assert_eq!(walked.len(), 8);
}

#[test]
fn walk_files_surfaces_stop_request() {
    let dir = setup_test_dir();
    let d = FilesystemDriver::new(dir.path());

    let mut seen = 0;
    let err = walk_files_fallback(&Context::background(), &d, "/", |_| {
        seen += 1;
        Ok(Visit::SkipDir)
    })
    .unwrap_err();

    assert!(matches!(err, StorageError::Pruned { .. }));
    assert_eq!(err.path(), Some("/README.md"));
    assert_eq!(seen, 1);
}
