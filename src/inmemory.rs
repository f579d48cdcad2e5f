use std::collections::BTreeMap;
use std::sync::RwLock;
use std::time::SystemTime;

use crate::context::Context;
use crate::entry::FileInfo;
use crate::error::StorageError;
use crate::path;
use crate::traits::StorageDriver;

const DRIVER_NAME: &str = "inmemory";

#[derive(Debug, Clone)]
enum Node {
    File { content: Vec<u8>, mod_time: SystemTime },
    Dir { mod_time: SystemTime },
}

/// In-memory, map-backed storage driver.
///
/// Intended for tests and embedding. Directories are created implicitly by
/// [`put_content`](StorageDriver::put_content) and live on until deleted.
/// `/` always exists. Keys are kept in a `BTreeMap`, so listings come back
/// sorted.
pub struct InMemoryDriver {
    nodes: RwLock<BTreeMap<String, Node>>,
}

impl InMemoryDriver {
    pub fn new() -> Self {
        Self {
            nodes: RwLock::new(BTreeMap::new()),
        }
    }

    /// Number of files currently stored.
    pub fn file_count(&self) -> usize {
        self.read_nodes()
            .values()
            .filter(|n| matches!(n, Node::File { .. }))
            .count()
    }

    fn read_nodes(&self) -> std::sync::RwLockReadGuard<'_, BTreeMap<String, Node>> {
        self.nodes.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_nodes(&self) -> std::sync::RwLockWriteGuard<'_, BTreeMap<String, Node>> {
        self.nodes.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check(&self, ctx: &Context, p: &str) -> Result<(), StorageError> {
        ctx.check()?;
        path::validate(p, DRIVER_NAME)
    }
}

impl Default for InMemoryDriver {
    fn default() -> Self {
        Self::new()
    }
}

/// Create every missing ancestor of `p` as a directory, failing if one of
/// them is already a file.
fn make_parents(nodes: &mut BTreeMap<String, Node>, p: &str, now: SystemTime) -> Result<(), StorageError> {
    let mut ancestors = Vec::new();
    let mut cur = path::parent(p);
    while let Some(dir) = cur {
        if dir == "/" {
            break;
        }
        ancestors.push(dir.to_string());
        cur = path::parent(dir);
    }
    for dir in ancestors.into_iter().rev() {
        match nodes.get(&dir) {
            Some(Node::File { .. }) => {
                return Err(StorageError::Driver(format!("{DRIVER_NAME}: {dir} is not a directory")));
            }
            Some(Node::Dir { .. }) => {}
            None => {
                nodes.insert(dir, Node::Dir { mod_time: now });
            }
        }
    }
    Ok(())
}

/// Keys of `p` and everything beneath it.
fn subtree_keys(nodes: &BTreeMap<String, Node>, p: &str) -> Vec<String> {
    nodes
        .range(p.to_string()..)
        .map(|(k, _)| k)
        .take_while(|k| k.starts_with(p))
        .filter(|k| k.as_str() == p || path::is_descendant(k, p))
        .cloned()
        .collect()
}

impl StorageDriver for InMemoryDriver {
    fn name(&self) -> &str {
        DRIVER_NAME
    }

    fn get_content(&self, ctx: &Context, p: &str) -> Result<Vec<u8>, StorageError> {
        self.check(ctx, p)?;
        match self.read_nodes().get(p) {
            Some(Node::File { content, .. }) => Ok(content.clone()),
            Some(Node::Dir { .. }) => Err(StorageError::Driver(format!("{DRIVER_NAME}: {p} is a directory"))),
            None => Err(StorageError::not_found(p, DRIVER_NAME)),
        }
    }

    fn put_content(&self, ctx: &Context, p: &str, content: &[u8]) -> Result<(), StorageError> {
        self.check(ctx, p)?;
        if p == "/" {
            return Err(StorageError::invalid_path(p, DRIVER_NAME));
        }
        let now = SystemTime::now();
        let mut nodes = self.write_nodes();
        if let Some(Node::Dir { .. }) = nodes.get(p) {
            return Err(StorageError::Driver(format!("{DRIVER_NAME}: {p} is a directory")));
        }
        make_parents(&mut nodes, p, now)?;
        nodes.insert(
            p.to_string(),
            Node::File {
                content:  content.to_vec(),
                mod_time: now,
            },
        );
        Ok(())
    }

    fn stat(&self, ctx: &Context, p: &str) -> Result<FileInfo, StorageError> {
        self.check(ctx, p)?;
        if p == "/" {
            return Ok(FileInfo::dir(p));
        }
        match self.read_nodes().get(p) {
            Some(Node::File { content, mod_time }) => {
                Ok(FileInfo::file(p, content.len() as u64).with_mod_time(*mod_time))
            }
            Some(Node::Dir { mod_time }) => Ok(FileInfo::dir(p).with_mod_time(*mod_time)),
            None => Err(StorageError::not_found(p, DRIVER_NAME)),
        }
    }

    fn list(&self, ctx: &Context, p: &str) -> Result<Vec<String>, StorageError> {
        self.check(ctx, p)?;
        let nodes = self.read_nodes();
        let children = nodes
            .keys()
            .filter(|k| path::parent(k) == Some(p))
            .cloned()
            .collect();
        Ok(children)
    }

    fn move_path(&self, ctx: &Context, source: &str, dest: &str) -> Result<(), StorageError> {
        self.check(ctx, source)?;
        path::validate(dest, DRIVER_NAME)?;
        if source == dest {
            return Ok(());
        }
        if source == "/"
            || dest == "/"
            || path::is_descendant(dest, source)
            || path::is_descendant(source, dest)
        {
            return Err(StorageError::invalid_path(dest, DRIVER_NAME));
        }

        let now = SystemTime::now();
        let mut nodes = self.write_nodes();
        let moving = subtree_keys(&nodes, source);
        if moving.is_empty() {
            return Err(StorageError::not_found(source, DRIVER_NAME));
        }
        make_parents(&mut nodes, dest, now)?;
        for key in subtree_keys(&nodes, dest) {
            nodes.remove(&key);
        }
        for key in moving {
            if let Some(node) = nodes.remove(&key) {
                let renamed = format!("{dest}{}", &key[source.len()..]);
                nodes.insert(renamed, node);
            }
        }
        Ok(())
    }

    fn delete(&self, ctx: &Context, p: &str) -> Result<(), StorageError> {
        self.check(ctx, p)?;
        let mut nodes = self.write_nodes();
        let doomed = if p == "/" {
            nodes.keys().cloned().collect()
        } else {
            subtree_keys(&nodes, p)
        };
        if doomed.is_empty() && p != "/" {
            return Err(StorageError::not_found(p, DRIVER_NAME));
        }
        for key in doomed {
            nodes.remove(&key);
        }
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryDriver")
            .field("file_count", &self.file_count())
            .finish()
    }
}
