//! Resolving, checking and building bundles, and producing their URLs.

use std::path::{Path, PathBuf};

use gloss_cache::{BundleId, CacheContext, CacheError};
use gloss_common::{AssetKind, ModTime, Mode};
use gloss_config::{GlossConfig, PathResolver};
use tracing::{debug, info};

use crate::compile::{compile_with, min_name};
use crate::compiler::{Compiler, ConcatCompiler};
use crate::error::PipelineError;
use crate::filter::FilterSet;

/// The result of [`AssetPipeline::ensure_built`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutcome {
    /// The bundle's id.
    pub id: BundleId,
    /// Where the artifact now lives.
    pub artifact: PathBuf,
    /// `true` if the artifact was stale and has just been rebuilt.
    pub rebuilt: bool,
}

/// Builds bundles on demand from a loaded configuration.
///
/// Owns the [`CacheContext`]; dropping or [closing](AssetPipeline::close)
/// the pipeline persists the cache in development mode.
pub struct AssetPipeline {
    resolver: PathResolver,
    context: CacheContext,
    filters: FilterSet,
    script_compiler: Box<dyn Compiler>,
    style_compiler: Box<dyn Compiler>,
}

impl AssetPipeline {
    /// Creates a pipeline for `config`, whose relative paths are anchored at
    /// `project_dir`. Both compilers default to [`ConcatCompiler`].
    pub fn new(config: &GlossConfig, project_dir: &Path) -> Result<Self, PipelineError> {
        let resolver = PathResolver::new(config, project_dir);
        let filters = FilterSet::from_config(&config.filters)?;
        let context = CacheContext::open(&resolver.paths().cache_dir, config.mode);
        debug!(
            root = %resolver.paths().root_dir.display(),
            filters = filters.len(),
            mode = %config.mode,
            "asset pipeline ready"
        );
        Ok(Self {
            resolver,
            context,
            filters,
            script_compiler: Box::new(ConcatCompiler),
            style_compiler: Box::new(ConcatCompiler),
        })
    }

    /// Replaces the compiler used for inputs of script bundles.
    pub fn with_script_compiler(mut self, compiler: impl Compiler + 'static) -> Self {
        self.script_compiler = Box::new(compiler);
        self
    }

    /// Replaces the compiler used for inputs of stylesheet bundles.
    pub fn with_style_compiler(mut self, compiler: impl Compiler + 'static) -> Self {
        self.style_compiler = Box::new(compiler);
        self
    }

    /// The mode the cache was opened in.
    pub fn mode(&self) -> Mode {
        self.context.mode()
    }

    /// The path resolver built from the configuration.
    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// The underlying cache.
    pub fn context(&self) -> &CacheContext {
        &self.context
    }

    /// Returns the URL to reference `output` from a page.
    ///
    /// In production mode this is [`AssetPipeline::prod_url`] and nothing is
    /// checked. Otherwise the bundle is rebuilt if stale and the URL points
    /// at the cached artifact under the development prefix, versioned by its
    /// mtime.
    pub fn url(&mut self, output: &str, inputs: &[String]) -> Result<String, PipelineError> {
        if self.mode().is_production() {
            return Ok(self.prod_url(output));
        }
        let outcome = self.ensure_built(output, inputs)?;
        self.artifact_url(&outcome.artifact)
    }

    /// Returns `/<output with .min before its extension>?v=<mtime>`, the
    /// version being the mtime of that file under the web directory, or
    /// empty if it does not exist.
    pub fn prod_url(&self, output: &str) -> String {
        let minified = min_name(output.trim_start_matches('/'));
        let on_disk = self.resolver.paths().web_dir.join(&minified);
        let version = ModTime::of(&on_disk)
            .map(|t| t.to_string())
            .unwrap_or_default();
        format!("/{minified}?v={version}")
    }

    /// Resolves `inputs` and registers the bundle with the cache.
    pub fn register(&mut self, output: &str, inputs: &[String]) -> Result<BundleId, PipelineError> {
        output_kind(output)?;
        let resolved = self.resolver.resolve_bundle(inputs)?;
        Ok(self
            .context
            .add_bundle_with_filters(output, &resolved.inputs, &resolved.filters))
    }

    /// Registers the bundle and reports whether its artifact is fresh.
    pub fn check(&mut self, output: &str, inputs: &[String]) -> Result<bool, PipelineError> {
        let id = self.register(output, inputs)?;
        Ok(self.context.is_fresh(&id)?)
    }

    /// Registers the bundle and rebuilds it if it is not fresh.
    pub fn ensure_built(
        &mut self,
        output: &str,
        inputs: &[String],
    ) -> Result<BuildOutcome, PipelineError> {
        let id = self.register(output, inputs)?;
        let rebuilt = !self.context.is_fresh(&id)?;
        let artifact = if rebuilt {
            self.build(&id)?
        } else {
            self.context.cached_artifact_path(&id)?.to_path_buf()
        };
        Ok(BuildOutcome {
            id,
            artifact,
            rebuilt,
        })
    }

    /// Unconditionally builds a registered bundle and returns the artifact path.
    ///
    /// Each input is compiled and run through the filters whose `apply_to`
    /// matches it; the results are joined with newlines and the combined
    /// text goes through the bundle's own filters plus those matching the
    /// output name.
    pub fn build(&mut self, id: &BundleId) -> Result<PathBuf, PipelineError> {
        let bundle = self
            .context
            .bundle(id)
            .cloned()
            .ok_or_else(|| CacheError::UnknownBundle { id: id.to_string() })?;
        let compiler = match output_kind(&bundle.output)? {
            AssetKind::Script => &self.script_compiler,
            _ => &self.style_compiler,
        };

        let mut parts = Vec::with_capacity(bundle.inputs.len());
        for input in &bundle.inputs {
            let text = compiler.compile(input)?;
            parts.push(self.filters.apply_for(input, &[], text)?);
        }
        let combined = self.filters.apply_for(
            Path::new(&bundle.output),
            &bundle.filters,
            parts.join("\n"),
        )?;

        if let Some(parent) = bundle.cached_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
        }
        std::fs::write(&bundle.cached_path, combined)
            .map_err(|e| PipelineError::io(&bundle.cached_path, e))?;
        info!(
            output = %bundle.output,
            inputs = bundle.inputs.len(),
            artifact = %bundle.cached_path.display(),
            "built bundle"
        );
        Ok(bundle.cached_path)
    }

    /// Compiles one file into `out_dir` using this pipeline's compilers and
    /// the filters whose `apply_to` matches it.
    pub fn compile_asset(
        &self,
        input: &Path,
        out_dir: &Path,
        minify: bool,
    ) -> Result<PathBuf, PipelineError> {
        let compiler: &dyn Compiler = match AssetKind::from_path(input) {
            AssetKind::Script => self.script_compiler.as_ref(),
            _ => self.style_compiler.as_ref(),
        };
        compile_with(compiler, &self.filters, input, out_dir, minify)
    }

    /// Deletes every built artifact and the sidecar, consuming the pipeline
    /// without saving. Returns `false` if there was nothing to delete.
    pub fn clean(self) -> Result<bool, PipelineError> {
        Ok(self.context.clear()?)
    }

    /// Persists the cache (development mode) and consumes the pipeline.
    pub fn close(self) {
        self.context.close();
    }

    /// Returns `<dev_prefix>/<path below the artifact directory>?v=<mtime>`.
    pub fn artifact_url(&self, artifact: &Path) -> Result<String, PipelineError> {
        let version = ModTime::of(artifact).map_err(|e| PipelineError::io(artifact, e))?;
        let relative = artifact
            .strip_prefix(self.context.artifact_dir())
            .unwrap_or(artifact);
        let relative = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        Ok(format!(
            "{}/{relative}?v={version}",
            self.resolver.paths().dev_prefix
        ))
    }
}

/// Classifies an output by extension, accepting only scripts and stylesheets.
fn output_kind(output: &str) -> Result<AssetKind, PipelineError> {
    match AssetKind::from_path(Path::new(output)) {
        kind @ (AssetKind::Script | AssetKind::Stylesheet) => Ok(kind),
        _ => Err(PipelineError::UnknownAssetType(
            Path::new(output)
                .extension()
                .map(|e| e.to_string_lossy().into_owned())
                .unwrap_or_default(),
        )),
    }
}
