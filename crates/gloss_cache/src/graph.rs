//! Lazily computed direct-import edges between stylesheet sources.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::CacheError;
use crate::imports::ImportParser;

/// Caches the direct imports of each scanned file.
///
/// An entry is computed on first request and reused until
/// [`DependencyGraph::invalidate`] drops it, which the freshness checker
/// does whenever it sees the file's own mtime change.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    children: BTreeMap<PathBuf, Vec<PathBuf>>,
    scans: usize,
}

impl DependencyGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a graph from previously persisted edges.
    pub fn from_entries(children: BTreeMap<PathBuf, Vec<PathBuf>>) -> Self {
        Self { children, scans: 0 }
    }

    /// Returns the direct imports of `file`, scanning it if no entry is cached.
    pub fn children_of(&mut self, file: &Path) -> Result<&[PathBuf], CacheError> {
        if !self.children.contains_key(file) {
            let found = ImportParser::parse_file(file)?;
            self.scans += 1;
            debug!(file = %file.display(), imports = found.len(), "scanned imports");
            self.children.insert(file.to_path_buf(), found);
        }
        Ok(self.children.get(file).map(Vec::as_slice).unwrap_or(&[]))
    }

    /// Returns the cached imports of `file` without scanning.
    pub fn cached_children(&self, file: &Path) -> Option<&[PathBuf]> {
        self.children.get(file).map(Vec::as_slice)
    }

    /// Drops the cached entry for `file`. Returns `true` if one existed.
    pub fn invalidate(&mut self, file: &Path) -> bool {
        let dropped = self.children.remove(file).is_some();
        if dropped {
            debug!(file = %file.display(), "invalidated import list");
        }
        dropped
    }

    /// All cached edges, in path order.
    pub fn entries(&self) -> &BTreeMap<PathBuf, Vec<PathBuf>> {
        &self.children
    }

    /// Number of files with a cached entry.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of files parsed since this graph was created or loaded.
    pub fn scan_count(&self) -> usize {
        self.scans
    }
}
