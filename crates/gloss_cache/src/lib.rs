//! Incremental freshness cache for web asset bundles.
//!
//! A bundle is a set of input files combined into one cached artifact. The
//! cache answers whether that artifact is still fresh by comparing file
//! modification times, following `@import` chains of stylesheet sources so
//! that a change to a deeply imported partial invalidates every bundle that
//! reaches it. Observed times and import edges persist in a JSON sidecar
//! between runs so unchanged files are never reparsed.

#![warn(missing_docs)]

pub mod bundle;
pub mod context;
pub mod error;
pub mod freshness;
pub mod graph;
pub mod imports;
pub mod ledger;
pub mod store;

pub use bundle::{BundleDescriptor, BundleId, BundleRegistry};
pub use context::CacheContext;
pub use error::CacheError;
pub use freshness::{FreshnessChecker, StalenessMemo};
pub use graph::DependencyGraph;
pub use imports::ImportParser;
pub use ledger::{ModTimeLedger, Observation};
pub use store::{PersistentStore, Sidecar, CACHE_SUBDIR};

#[cfg(test)]
pub(crate) mod test_util {
    use gloss_common::ModTime;
    use std::fs::File;
    use std::path::Path;

    /// Writes `contents` to `path` and pins its mtime to `secs`.
    pub fn write_at(path: &Path, contents: &str, secs: u64) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, contents).unwrap();
        touch(path, secs);
    }

    /// Sets the mtime of an existing file.
    pub fn touch(path: &Path, secs: u64) {
        let file = File::options().write(true).open(path).unwrap();
        file.set_modified(ModTime::from_secs(secs).to_system_time())
            .unwrap();
    }
}
