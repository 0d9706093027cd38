//! The cache context: bundle registry, ledger and graph for one cache
//! directory, with explicit persistence.

use std::path::{Path, PathBuf};

use gloss_common::Mode;
use tracing::{debug, warn};

use crate::bundle::{BundleDescriptor, BundleId, BundleRegistry};
use crate::error::CacheError;
use crate::freshness::FreshnessChecker;
use crate::graph::DependencyGraph;
use crate::ledger::ModTimeLedger;
use crate::store::PersistentStore;

/// Owns all cache state for one cache directory.
///
/// In development mode the ledger and graph are loaded from the sidecar on
/// [`CacheContext::open`] and written back on [`CacheContext::flush`],
/// [`CacheContext::close`] or drop. In production mode nothing is loaded or
/// saved and freshness reduces to whether the artifact exists.
///
/// Methods take `&mut self`; share a context across threads behind a mutex.
pub struct CacheContext {
    mode: Mode,
    cache_dir: PathBuf,
    store: PersistentStore,
    ledger: ModTimeLedger,
    graph: DependencyGraph,
    bundles: BundleRegistry,
    closed: bool,
}

impl CacheContext {
    /// Opens the cache under `cache_dir`. Never fails: an unusable sidecar
    /// means starting with empty state.
    pub fn open(cache_dir: &Path, mode: Mode) -> Self {
        let store = PersistentStore::new(cache_dir);
        let (ledger, graph) = match mode {
            Mode::Development => store.load(),
            Mode::Production => (ModTimeLedger::new(), DependencyGraph::new()),
        };
        debug!(cache_dir = %cache_dir.display(), %mode, "opened cache");
        Self {
            mode,
            cache_dir: cache_dir.to_path_buf(),
            bundles: BundleRegistry::new(store.dir()),
            store,
            ledger,
            graph,
            closed: false,
        }
    }

    /// The mode this context was opened in.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The cache directory passed to [`CacheContext::open`].
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// The directory holding built artifacts and the sidecar.
    pub fn artifact_dir(&self) -> &Path {
        self.store.dir()
    }

    /// Registers a bundle with no output filters.
    pub fn add_bundle(&mut self, output: &str, inputs: &[PathBuf]) -> BundleId {
        self.bundles.register(output, inputs, &[])
    }

    /// Registers a bundle whose combined output goes through `filters`.
    pub fn add_bundle_with_filters(
        &mut self,
        output: &str,
        inputs: &[PathBuf],
        filters: &[String],
    ) -> BundleId {
        self.bundles.register(output, inputs, filters)
    }

    /// Looks up a registered bundle.
    pub fn bundle(&self, id: &BundleId) -> Option<&BundleDescriptor> {
        self.bundles.get(id)
    }

    /// Reports whether the bundle's artifact is up to date.
    pub fn is_fresh(&mut self, id: &BundleId) -> Result<bool, CacheError> {
        let bundle = self.bundles.get(id).ok_or_else(|| CacheError::UnknownBundle {
            id: id.to_string(),
        })?;
        let fresh = match self.mode {
            Mode::Production => bundle.cached_path.is_file(),
            Mode::Development => FreshnessChecker::new(&mut self.ledger, &mut self.graph)
                .is_fresh(&bundle.cached_path, &bundle.inputs)?,
        };
        debug!(bundle = %id, output = %bundle.output, fresh, "freshness verdict");
        Ok(fresh)
    }

    /// Where the bundle's artifact is (or will be) stored.
    pub fn cached_artifact_path(&self, id: &BundleId) -> Result<&Path, CacheError> {
        self.bundles
            .get(id)
            .map(|b| b.cached_path.as_path())
            .ok_or_else(|| CacheError::UnknownBundle { id: id.to_string() })
    }

    /// The mtime ledger.
    pub fn ledger(&self) -> &ModTimeLedger {
        &self.ledger
    }

    /// The import graph.
    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// Writes the sidecar now. A no-op in production mode.
    pub fn flush(&self) -> Result<(), CacheError> {
        if self.mode.is_production() {
            return Ok(());
        }
        self.store.save(&self.ledger, &self.graph)
    }

    /// Saves and consumes the context, logging instead of returning any
    /// persistence failure.
    pub fn close(mut self) {
        self.flush_best_effort();
        self.closed = true;
    }

    /// Deletes the sidecar and every built artifact, consuming the context
    /// without saving. Returns `false` if there was nothing to delete.
    pub fn clear(mut self) -> Result<bool, CacheError> {
        self.closed = true;
        self.store.clear()
    }

    fn flush_best_effort(&self) {
        if let Err(e) = self.flush() {
            warn!(error = %e, "failed to persist asset cache");
        }
    }
}

impl Drop for CacheContext {
    fn drop(&mut self) {
        if !self.closed {
            self.flush_best_effort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::write_at;

    #[test]
    fn unknown_bundle_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = CacheContext::open(dir.path(), Mode::Development);
        let id = BundleId::compute("x.js", &[]);
        assert!(matches!(ctx.is_fresh(&id), Err(CacheError::UnknownBundle { .. })));
        assert!(matches!(
            ctx.cached_artifact_path(&id),
            Err(CacheError::UnknownBundle { .. })
        ));
    }

    #[test]
    fn artifact_lives_under_gloss_subdir() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = CacheContext::open(dir.path(), Mode::Development);
        let id = ctx.add_bundle("css/app.css", &[PathBuf::from("a.scss")]);
        let path = ctx.cached_artifact_path(&id).unwrap();
        assert_eq!(path, dir.path().join(format!("gloss/css/app-{id}.css")));
    }

    #[test]
    fn production_only_checks_existence() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("a.js");
        write_at(&input, "", 500);

        let mut ctx = CacheContext::open(dir.path(), Mode::Production);
        let id = ctx.add_bundle("app.js", &[input]);
        assert!(!ctx.is_fresh(&id).unwrap());

        let artifact = ctx.cached_artifact_path(&id).unwrap().to_path_buf();
        write_at(&artifact, "", 100);
        assert!(ctx.is_fresh(&id).unwrap());
        assert_eq!(ctx.ledger().observation_count(), 0);
    }

    #[test]
    fn production_never_writes_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = CacheContext::open(dir.path(), Mode::Production);
        ctx.flush().unwrap();
        drop(ctx);
        assert!(!dir.path().join("gloss/cache.json").exists());
    }

    #[test]
    fn drop_flushes_in_development() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("a.js");
        write_at(&input, "", 100);
        {
            let mut ctx = CacheContext::open(dir.path(), Mode::Development);
            let id = ctx.add_bundle("app.js", &[input.clone()]);
            let artifact = ctx.cached_artifact_path(&id).unwrap().to_path_buf();
            write_at(&artifact, "", 200);
            assert!(ctx.is_fresh(&id).unwrap());
        }
        let ctx = CacheContext::open(dir.path(), Mode::Development);
        assert!(ctx.ledger().recorded(&input).is_some());
    }

    #[test]
    fn clear_removes_state_without_resaving() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = CacheContext::open(dir.path(), Mode::Development);
        ctx.flush().unwrap();
        assert!(dir.path().join("gloss/cache.json").exists());

        let ctx = CacheContext::open(dir.path(), Mode::Development);
        assert!(ctx.clear().unwrap());
        assert!(!dir.path().join("gloss").exists());
    }

    #[test]
    fn close_swallows_persistence_failure() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();

        let ctx = CacheContext::open(&blocker, Mode::Development);
        assert!(matches!(ctx.flush(), Err(CacheError::Persistence { .. })));
        ctx.close();
    }
}
