//! The JSON sidecar that carries the ledger and graph between runs.
//!
//! The sidecar lives at `<cache_dir>/gloss/cache.json` next to the built
//! artifacts. Loading is fail-safe: a missing, unreadable or corrupt file
//! yields empty state and the next checks simply rescan. Saving replaces
//! the file wholesale through a temporary file and a rename.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use gloss_common::ModTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::CacheError;
use crate::graph::DependencyGraph;
use crate::ledger::ModTimeLedger;

/// Subdirectory of the cache directory owned by Gloss.
pub const CACHE_SUBDIR: &str = "gloss";

/// Name of the sidecar file within [`CACHE_SUBDIR`].
const SIDECAR_FILE: &str = "cache.json";

/// On-disk form of the cache state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sidecar {
    /// Last observed mtime per file.
    #[serde(default)]
    pub asset_list: BTreeMap<PathBuf, ModTime>,

    /// Direct imports per scanned file.
    #[serde(default)]
    pub asset_children: BTreeMap<PathBuf, Vec<PathBuf>>,
}

/// Reads and writes the sidecar for one cache directory.
#[derive(Debug, Clone)]
pub struct PersistentStore {
    dir: PathBuf,
}

impl PersistentStore {
    /// Creates a store rooted at `<cache_dir>/gloss`.
    pub fn new(cache_dir: &Path) -> Self {
        Self {
            dir: cache_dir.join(CACHE_SUBDIR),
        }
    }

    /// The directory holding the sidecar and the built artifacts.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path of the sidecar file.
    pub fn sidecar_path(&self) -> PathBuf {
        self.dir.join(SIDECAR_FILE)
    }

    /// Loads the persisted ledger and graph, or empty state on any failure.
    pub fn load(&self) -> (ModTimeLedger, DependencyGraph) {
        let sidecar = self.read_sidecar().unwrap_or_default();
        debug!(
            files = sidecar.asset_list.len(),
            edges = sidecar.asset_children.len(),
            "loaded sidecar"
        );
        (
            ModTimeLedger::from_entries(sidecar.asset_list),
            DependencyGraph::from_entries(sidecar.asset_children),
        )
    }

    fn read_sidecar(&self) -> Option<Sidecar> {
        let path = self.sidecar_path();
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot read cache sidecar, starting empty");
                return None;
            }
        };
        match serde_json::from_str(&content) {
            Ok(sidecar) => Some(sidecar),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "corrupt cache sidecar, starting empty");
                None
            }
        }
    }

    /// Writes the ledger and graph, replacing any previous sidecar.
    ///
    /// Creates the directory if it doesn't exist.
    pub fn save(&self, ledger: &ModTimeLedger, graph: &DependencyGraph) -> Result<(), CacheError> {
        let sidecar = Sidecar {
            asset_list: ledger.entries().clone(),
            asset_children: graph.entries().clone(),
        };
        std::fs::create_dir_all(&self.dir).map_err(|e| CacheError::persistence(&self.dir, e))?;

        let json = serde_json::to_string(&sidecar).map_err(|e| CacheError::Serialization {
            reason: e.to_string(),
        })?;
        let path = self.sidecar_path();
        let tmp = self.dir.join(format!("{SIDECAR_FILE}.tmp"));
        std::fs::write(&tmp, json).map_err(|e| CacheError::persistence(&tmp, e))?;
        std::fs::rename(&tmp, &path).map_err(|e| CacheError::persistence(&path, e))?;
        debug!(path = %path.display(), files = sidecar.asset_list.len(), "saved sidecar");
        Ok(())
    }

    /// Removes the whole Gloss subdirectory: sidecar and built artifacts.
    ///
    /// Returns `false` if there was nothing to remove.
    pub fn clear(&self) -> Result<bool, CacheError> {
        match std::fs::remove_dir_all(&self.dir) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CacheError::persistence(&self.dir, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_state() -> (ModTimeLedger, DependencyGraph) {
        let mut times = BTreeMap::new();
        times.insert(PathBuf::from("/site/base.scss"), ModTime::from_secs(100));
        times.insert(PathBuf::from("/site/_vars.scss"), ModTime::from_secs(90));
        let mut edges = BTreeMap::new();
        edges.insert(
            PathBuf::from("/site/base.scss"),
            vec![PathBuf::from("/site/_vars.scss")],
        );
        edges.insert(PathBuf::from("/site/_vars.scss"), Vec::new());
        (
            ModTimeLedger::from_entries(times),
            DependencyGraph::from_entries(edges),
        )
    }

    #[test]
    fn missing_sidecar_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let (ledger, graph) = PersistentStore::new(dir.path()).load();
        assert!(ledger.is_empty());
        assert!(graph.is_empty());
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = PersistentStore::new(dir.path());
        let (ledger, graph) = sample_state();
        store.save(&ledger, &graph).unwrap();

        let (ledger2, graph2) = store.load();
        assert_eq!(ledger2.entries(), ledger.entries());
        assert_eq!(graph2.entries(), graph.entries());
        assert!(!dir.path().join("gloss/cache.json.tmp").exists());
    }

    #[test]
    fn sidecar_uses_expected_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = PersistentStore::new(dir.path());
        let (ledger, graph) = sample_state();
        store.save(&ledger, &graph).unwrap();

        let raw = std::fs::read_to_string(dir.path().join("gloss/cache.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["assetList"]["/site/base.scss"], 100);
        assert_eq!(value["assetChildren"]["/site/base.scss"][0], "/site/_vars.scss");
    }

    #[test]
    fn save_replaces_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let store = PersistentStore::new(dir.path());
        let (ledger, graph) = sample_state();
        store.save(&ledger, &graph).unwrap();
        store
            .save(&ModTimeLedger::new(), &DependencyGraph::new())
            .unwrap();

        let (ledger2, graph2) = store.load();
        assert!(ledger2.is_empty());
        assert!(graph2.is_empty());
    }

    #[test]
    fn corrupt_sidecar_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("gloss")).unwrap();
        std::fs::write(dir.path().join("gloss/cache.json"), "{ not json").unwrap();

        let (ledger, graph) = PersistentStore::new(dir.path()).load();
        assert!(ledger.is_empty());
        assert!(graph.is_empty());
    }

    #[test]
    fn partial_sidecar_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("gloss")).unwrap();
        std::fs::write(
            dir.path().join("gloss/cache.json"),
            r#"{"assetList": {"/a.js": 7}}"#,
        )
        .unwrap();

        let (ledger, graph) = PersistentStore::new(dir.path()).load();
        assert_eq!(ledger.recorded(Path::new("/a.js")), Some(ModTime::from_secs(7)));
        assert!(graph.is_empty());
    }

    #[test]
    fn save_into_unwritable_location_errors() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "").unwrap();

        let err = PersistentStore::new(&blocker)
            .save(&ModTimeLedger::new(), &DependencyGraph::new())
            .unwrap_err();
        assert!(matches!(err, CacheError::Persistence { .. }));
    }

    #[test]
    fn clear_removes_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = PersistentStore::new(dir.path());
        assert!(!store.clear().unwrap());
        store
            .save(&ModTimeLedger::new(), &DependencyGraph::new())
            .unwrap();
        assert!(store.clear().unwrap());
        assert!(!store.dir().exists());
    }
}
