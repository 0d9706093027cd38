//! Staleness decisions for a bundle artifact against its inputs and their
//! transitive stylesheet imports.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use gloss_common::{AssetKind, ModTime};
use tracing::debug;

use crate::error::CacheError;
use crate::graph::DependencyGraph;
use crate::ledger::ModTimeLedger;

/// Per-query verdicts for files already visited by an import walk.
///
/// A file is marked not-stale when its walk begins, so an import cycle that
/// leads back to it terminates. The final verdict overwrites that mark.
#[derive(Debug, Default)]
pub struct StalenessMemo {
    verdicts: HashMap<PathBuf, bool>,
}

impl StalenessMemo {
    /// Creates an empty memo.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the verdict for `file` if it was already visited.
    pub fn get(&self, file: &Path) -> Option<bool> {
        self.verdicts.get(file).copied()
    }

    /// Marks `file` as in progress.
    pub fn begin(&mut self, file: &Path) {
        self.verdicts.insert(file.to_path_buf(), false);
    }

    /// Records the final verdict for `file`.
    pub fn settle(&mut self, file: &Path, stale: bool) {
        self.verdicts.insert(file.to_path_buf(), stale);
    }

    /// Number of files visited.
    pub fn len(&self) -> usize {
        self.verdicts.len()
    }

    /// Returns `true` if no file has been visited.
    pub fn is_empty(&self) -> bool {
        self.verdicts.is_empty()
    }
}

/// Decides whether a cached artifact is still newer than everything that
/// went into it.
///
/// Borrows the context's ledger and graph for the duration of one query;
/// every observation it makes is recorded, so later queries for other
/// bundles sharing the same files see the refreshed state.
pub struct FreshnessChecker<'a> {
    ledger: &'a mut ModTimeLedger,
    graph: &'a mut DependencyGraph,
}

impl<'a> FreshnessChecker<'a> {
    /// Creates a checker over the given ledger and graph.
    pub fn new(ledger: &'a mut ModTimeLedger, graph: &'a mut DependencyGraph) -> Self {
        Self { ledger, graph }
    }

    /// Returns `true` if `artifact` exists and no input, nor any file
    /// transitively imported by a stylesheet-source input, is newer.
    ///
    /// Direct inputs are all checked before any import is followed. A
    /// missing direct input is [`CacheError::ResourceNotFound`].
    pub fn is_fresh(&mut self, artifact: &Path, inputs: &[PathBuf]) -> Result<bool, CacheError> {
        let built_at = match ModTime::of(artifact) {
            Ok(t) => t,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(artifact = %artifact.display(), "artifact missing");
                return Ok(false);
            }
            Err(e) => return Err(CacheError::from_read(artifact, e)),
        };

        let mut sources = Vec::new();
        for input in inputs {
            let obs = self.ledger.observe(input)?;
            if obs.changed() {
                self.graph.invalidate(input);
            }
            if obs.current.is_newer_than(built_at) {
                debug!(input = %input.display(), "input newer than artifact");
                return Ok(false);
            }
            if AssetKind::from_path(input).is_import_capable() {
                sources.push(input);
            }
        }

        let mut memo = StalenessMemo::new();
        for source in sources {
            if self.imports_stale(source, built_at, &mut memo) {
                debug!(input = %source.display(), "import newer than artifact");
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Observes `file` and reports whether it, or anything it transitively
    /// imports, is newer than `built_at`.
    ///
    /// Never fails: a file that cannot be stat'd is dropped from the ledger
    /// and graph and treated as a leaf that is not stale.
    pub fn is_subtree_stale(
        &mut self,
        file: &Path,
        built_at: ModTime,
        memo: &mut StalenessMemo,
    ) -> bool {
        if let Some(verdict) = memo.get(file) {
            return verdict;
        }
        let obs = match self.ledger.observe(file) {
            Ok(obs) => obs,
            Err(e) => {
                debug!(file = %file.display(), error = %e, "import vanished");
                self.ledger.forget(file);
                self.graph.invalidate(file);
                memo.settle(file, false);
                return false;
            }
        };
        if obs.changed() {
            self.graph.invalidate(file);
        }
        if obs.current.is_newer_than(built_at) {
            memo.settle(file, true);
            return true;
        }
        self.imports_stale(file, built_at, memo)
    }

    /// Walks the imports of an already-observed file.
    fn imports_stale(&mut self, file: &Path, built_at: ModTime, memo: &mut StalenessMemo) -> bool {
        if let Some(verdict) = memo.get(file) {
            return verdict;
        }
        memo.begin(file);

        let children = match self.graph.children_of(file) {
            Ok(children) => children.to_vec(),
            Err(e) => {
                debug!(file = %file.display(), error = %e, "cannot scan imports");
                Vec::new()
            }
        };

        let stale = children
            .iter()
            .any(|child| self.is_subtree_stale(child, built_at, memo));
        memo.settle(file, stale);
        stale
    }
}
