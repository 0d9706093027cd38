//! Path resolution: placeholder substitution and named-asset expansion.

use crate::error::ConfigError;
use crate::types::{AssetConfig, GlossConfig};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Absolute directories derived from the `[paths]` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    /// Project root every relative value is anchored to.
    pub root_dir: PathBuf,
    /// Cache directory.
    pub cache_dir: PathBuf,
    /// Public web directory.
    pub web_dir: PathBuf,
    /// URL prefix for development artifacts.
    pub dev_prefix: String,
}

/// The concrete inputs and filters for a bundle after expanding named assets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedBundle {
    /// Input files in bundle order.
    pub inputs: Vec<PathBuf>,
    /// Filters contributed by named assets, first occurrence first.
    pub filters: Vec<String>,
}

/// Turns configured values into filesystem paths.
///
/// Substitutions include the built-ins `%cache_dir%`, `%root_dir%` and
/// `%web_dir%` plus everything under `[paths.placeholders]`. Longer tokens
/// are substituted first so `@themes` is not clobbered by `@theme`.
#[derive(Debug, Clone)]
pub struct PathResolver {
    paths: ResolvedPaths,
    substitutions: Vec<(String, String)>,
    assets: BTreeMap<String, AssetConfig>,
}

impl PathResolver {
    /// Builds a resolver for `config`, anchoring a missing or relative
    /// `root_dir` at `project_dir`.
    pub fn new(config: &GlossConfig, project_dir: &Path) -> Self {
        let root_dir = match &config.paths.root_dir {
            Some(root) => absolutize(project_dir, root),
            None => project_dir.to_path_buf(),
        };
        let root_str = root_dir.to_string_lossy().into_owned();
        let cache_dir = absolutize(
            &root_dir,
            &config.paths.cache_dir.replace("%root_dir%", &root_str),
        );
        let web_dir = match &config.paths.web_dir {
            Some(web) => absolutize(&root_dir, &web.replace("%root_dir%", &root_str)),
            None => root_dir.join("web"),
        };

        let mut substitutions = vec![
            ("%cache_dir%".to_string(), cache_dir.to_string_lossy().into_owned()),
            ("%root_dir%".to_string(), root_str),
            ("%web_dir%".to_string(), web_dir.to_string_lossy().into_owned()),
        ];
        substitutions.extend(
            config
                .paths
                .placeholders
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        substitutions.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        Self {
            paths: ResolvedPaths {
                root_dir,
                cache_dir,
                web_dir,
                dev_prefix: config.paths.dev_prefix.trim_end_matches('/').to_string(),
            },
            substitutions,
            assets: config.assets.clone(),
        }
    }

    /// The resolved directory layout.
    pub fn paths(&self) -> &ResolvedPaths {
        &self.paths
    }

    /// Replaces every known placeholder token in `value`.
    pub fn substitute(&self, value: &str) -> String {
        self.substitutions
            .iter()
            .fold(value.to_string(), |acc, (token, replacement)| {
                acc.replace(token.as_str(), replacement)
            })
    }

    /// Resolves a configured value.
    ///
    /// Values containing `@`, `%` or `..` are treated as paths: placeholders
    /// are substituted, the result is anchored at the root directory and
    /// canonicalized, and it must exist. Other values are returned unchanged.
    pub fn resolve_value(&self, value: &str) -> Result<String, ConfigError> {
        if !needs_resolution(value) {
            return Ok(value.to_string());
        }
        let substituted = self.substitute(value);
        let candidate = absolutize(&self.paths.root_dir, &substituted);
        std::fs::canonicalize(&candidate)
            .map(|p| p.to_string_lossy().into_owned())
            .map_err(|_| ConfigError::ResourceNotFound { value: substituted })
    }

    /// Resolves a value to a path, anchoring plain relative values at the root.
    ///
    /// Unlike [`PathResolver::resolve_value`], a plain value is not required
    /// to exist yet.
    pub fn resolve_path(&self, value: &str) -> Result<PathBuf, ConfigError> {
        let resolved = self.resolve_value(value)?;
        Ok(absolutize(&self.paths.root_dir, &resolved))
    }

    /// Expands a bundle's input list.
    ///
    /// An entry naming a configured asset (`@site_css` or `site_css`) is
    /// replaced by that asset's inputs and contributes its filters. A bare
    /// `@name` that is neither an asset nor a placeholder is
    /// [`ConfigError::UnknownAsset`]. Everything else goes through
    /// [`PathResolver::resolve_path`].
    pub fn resolve_bundle(&self, inputs: &[String]) -> Result<ResolvedBundle, ConfigError> {
        let mut bundle = ResolvedBundle::default();
        for input in inputs {
            let name = input.strip_prefix('@').unwrap_or(input);
            if let Some(asset) = self.assets.get(name) {
                for value in &asset.inputs {
                    bundle.inputs.push(self.resolve_path(value)?);
                }
                for filter in &asset.filters {
                    if !bundle.filters.contains(filter) {
                        bundle.filters.push(filter.clone());
                    }
                }
                continue;
            }
            if self.is_bare_reference(input) {
                return Err(ConfigError::UnknownAsset(input.clone()));
            }
            bundle.inputs.push(self.resolve_path(input)?);
        }
        Ok(bundle)
    }

    fn is_bare_reference(&self, input: &str) -> bool {
        input.starts_with('@')
            && !input.contains(['/', '\\', '.'])
            && !self.substitutions.iter().any(|(token, _)| token == input)
    }
}

fn needs_resolution(value: &str) -> bool {
    value.contains('@') || value.contains('%') || value.contains("..")
}

fn absolutize(base: &Path, value: &str) -> PathBuf {
    let path = Path::new(value);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
