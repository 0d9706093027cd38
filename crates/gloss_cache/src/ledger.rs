//! Last-observed modification time of every file the cache has looked at.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use gloss_common::ModTime;

use crate::error::CacheError;

/// The outcome of stat'ing a file: what the ledger held before, and what
/// the filesystem reports now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observation {
    /// The previously recorded time, or `None` on first sight.
    pub previous: Option<ModTime>,
    /// The time just read from disk (now also recorded).
    pub current: ModTime,
}

impl Observation {
    /// Returns `true` unless the file was seen before with the same mtime.
    ///
    /// A first sighting counts as a change: nothing cached about the file
    /// can be trusted until two observations agree.
    pub fn changed(&self) -> bool {
        self.previous != Some(self.current)
    }
}

/// Maps file paths to the modification time they had when last observed.
///
/// Entries are created on first observation, overwritten whenever the
/// observed time differs, and removed only via [`ModTimeLedger::forget`].
#[derive(Debug, Clone, Default)]
pub struct ModTimeLedger {
    entries: BTreeMap<PathBuf, ModTime>,
    observations: usize,
}

impl ModTimeLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a ledger pre-populated with previously persisted entries.
    pub fn from_entries(entries: BTreeMap<PathBuf, ModTime>) -> Self {
        Self {
            entries,
            observations: 0,
        }
    }

    /// Stats `path`, records its current mtime and reports what changed.
    pub fn observe(&mut self, path: &Path) -> Result<Observation, CacheError> {
        self.observations += 1;
        let current = ModTime::of(path).map_err(|e| CacheError::from_read(path, e))?;
        let previous = self.entries.insert(path.to_path_buf(), current);
        Ok(Observation { previous, current })
    }

    /// Returns the recorded mtime without touching the filesystem.
    pub fn recorded(&self, path: &Path) -> Option<ModTime> {
        self.entries.get(path).copied()
    }

    /// Drops the entry for a file that no longer exists.
    pub fn forget(&mut self, path: &Path) -> Option<ModTime> {
        self.entries.remove(path)
    }

    /// All recorded entries, in path order.
    pub fn entries(&self) -> &BTreeMap<PathBuf, ModTime> {
        &self.entries
    }

    /// Number of tracked files.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no file is tracked.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of stat calls made through [`ModTimeLedger::observe`] since
    /// this ledger was created or loaded.
    pub fn observation_count(&self) -> usize {
        self.observations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{touch, write_at};

    #[test]
    fn first_observation_records_and_counts_as_change() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.css");
        write_at(&path, "", 1_000);

        let mut ledger = ModTimeLedger::new();
        let obs = ledger.observe(&path).unwrap();
        assert_eq!(obs.previous, None);
        assert_eq!(obs.current, ModTime::from_secs(1_000));
        assert!(obs.changed());
        assert_eq!(ledger.recorded(&path), Some(ModTime::from_secs(1_000)));
    }

    #[test]
    fn unchanged_file_is_not_a_change() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.css");
        write_at(&path, "", 1_000);

        let mut ledger = ModTimeLedger::new();
        ledger.observe(&path).unwrap();
        let obs = ledger.observe(&path).unwrap();
        assert!(!obs.changed());
        assert_eq!(ledger.observation_count(), 2);
    }

    #[test]
    fn touched_file_reports_previous_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.css");
        write_at(&path, "", 1_000);

        let mut ledger = ModTimeLedger::new();
        ledger.observe(&path).unwrap();
        touch(&path, 2_000);
        let obs = ledger.observe(&path).unwrap();
        assert_eq!(obs.previous, Some(ModTime::from_secs(1_000)));
        assert_eq!(obs.current, ModTime::from_secs(2_000));
        assert!(obs.changed());
    }

    #[test]
    fn missing_file_errors_and_leaves_ledger_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.js");
        let mut ledger = ModTimeLedger::new();

        let err = ledger.observe(&path).unwrap_err();
        assert!(matches!(err, CacheError::ResourceNotFound { .. }));
        assert!(ledger.is_empty());
        assert_eq!(ledger.observation_count(), 1);
    }

    #[test]
    fn forget_removes_entry() {
        let mut entries = BTreeMap::new();
        entries.insert(PathBuf::from("/a.less"), ModTime::from_secs(5));
        let mut ledger = ModTimeLedger::from_entries(entries);

        assert_eq!(ledger.forget(Path::new("/a.less")), Some(ModTime::from_secs(5)));
        assert_eq!(ledger.recorded(Path::new("/a.less")), None);
        assert_eq!(ledger.observation_count(), 0);
    }
}
