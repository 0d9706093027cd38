//! Bundle identity and the in-memory registry of known bundles.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use gloss_common::ContentHash;

/// Deterministic identifier of a bundle configuration.
///
/// The hex XXH3-128 digest of the JSON array `[output, [inputs...]]`. The
/// same output and inputs always produce the same id; input order matters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BundleId(String);

impl BundleId {
    /// Computes the id for `output` built from `inputs`.
    pub fn compute(output: &str, inputs: &[PathBuf]) -> Self {
        let inputs: Vec<String> = inputs
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect();
        let key = serde_json::json!([output, inputs]).to_string();
        Self(ContentHash::from_bytes(key.as_bytes()).to_string())
    }

    /// The id as a hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BundleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A registered bundle: what goes in, what comes out, and where the cached
/// artifact lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleDescriptor {
    /// The bundle's identifier.
    pub id: BundleId,
    /// The requested output name, e.g. `css/app.css`.
    pub output: String,
    /// Input files in the order they are combined.
    pub inputs: Vec<PathBuf>,
    /// Location of the built artifact.
    pub cached_path: PathBuf,
    /// Names of filters applied to the combined output, in order.
    pub filters: Vec<String>,
}

/// Returns `<artifact_dir>/<output dir>/<stem>-<id>.<ext>`.
pub fn artifact_path(artifact_dir: &Path, id: &BundleId, output: &str) -> PathBuf {
    let output = Path::new(output.trim_start_matches('/'));
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match output.extension() {
        Some(ext) => format!("{stem}-{id}.{}", ext.to_string_lossy()),
        None => format!("{stem}-{id}"),
    };
    match output.parent() {
        Some(parent) => artifact_dir.join(parent).join(name),
        None => artifact_dir.join(name),
    }
}

/// Bundles registered during this process, keyed by id. Never persisted.
#[derive(Debug, Clone)]
pub struct BundleRegistry {
    artifact_dir: PathBuf,
    bundles: HashMap<BundleId, BundleDescriptor>,
}

impl BundleRegistry {
    /// Creates an empty registry placing artifacts under `artifact_dir`.
    pub fn new(artifact_dir: &Path) -> Self {
        Self {
            artifact_dir: artifact_dir.to_path_buf(),
            bundles: HashMap::new(),
        }
    }

    /// Registers a bundle and returns its id.
    ///
    /// Registering the same output and inputs again returns the same id and
    /// replaces the filter list.
    pub fn register(&mut self, output: &str, inputs: &[PathBuf], filters: &[String]) -> BundleId {
        let id = BundleId::compute(output, inputs);
        let cached_path = artifact_path(&self.artifact_dir, &id, output);
        self.bundles.insert(
            id.clone(),
            BundleDescriptor {
                id: id.clone(),
                output: output.to_string(),
                inputs: inputs.to_vec(),
                cached_path,
                filters: filters.to_vec(),
            },
        );
        id
    }

    /// Looks up a registered bundle.
    pub fn get(&self, id: &BundleId) -> Option<&BundleDescriptor> {
        self.bundles.get(id)
    }

    /// Number of registered bundles.
    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }
}
