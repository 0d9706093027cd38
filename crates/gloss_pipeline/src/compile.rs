//! One-off compilation of a single asset into an output directory.

use std::path::{Path, PathBuf};

use gloss_common::AssetKind;
use gloss_config::FilterKind;
use tracing::debug;

use crate::compiler::{Compiler, ConcatCompiler};
use crate::error::PipelineError;
use crate::filter::{Filter, FilterSet};

/// Returns the file name `input` compiles to.
///
/// Stylesheet sources become `<stem>.min.css` (or `<stem>.css`), images and
/// fonts keep their name, and anything else gains `.min` before its
/// extension when minifying.
pub fn compiled_file_name(input: &Path, minify: bool) -> Option<String> {
    let name = input.file_name()?.to_str()?;
    let stem = input.file_stem()?.to_str()?;
    let renamed = match AssetKind::from_path(input) {
        AssetKind::StyleSource(_) if minify => format!("{stem}.min.css"),
        AssetKind::StyleSource(_) => format!("{stem}.css"),
        AssetKind::Image | AssetKind::Font => name.to_string(),
        _ if minify => min_name(name),
        _ => name.to_string(),
    };
    Some(renamed)
}

/// Inserts `.min` before the extension of `name`, if it has one.
pub(crate) fn min_name(name: &str) -> String {
    let path = Path::new(name);
    match (path.file_stem(), path.extension()) {
        (Some(stem), Some(ext)) => {
            let file = format!("{}.min.{}", stem.to_string_lossy(), ext.to_string_lossy());
            match path.parent().filter(|p| !p.as_os_str().is_empty()) {
                Some(parent) => format!("{}/{file}", parent.to_string_lossy()),
                None => file,
            }
        }
        _ => name.to_string(),
    }
}

/// Compiles `input` into `out_dir`, creating the directory if needed, and
/// returns the written path.
///
/// Inputs are read verbatim; when `minify` is set the result goes through
/// the `minify` filter with default options. Images and fonts are copied.
pub fn compile_asset(input: &Path, out_dir: &Path, minify: bool) -> Result<PathBuf, PipelineError> {
    compile_with(&ConcatCompiler, &FilterSet::default(), input, out_dir, minify)
}

pub(crate) fn compile_with(
    compiler: &dyn Compiler,
    filters: &FilterSet,
    input: &Path,
    out_dir: &Path,
    minify: bool,
) -> Result<PathBuf, PipelineError> {
    let input = std::fs::canonicalize(input).map_err(|e| PipelineError::io(input, e))?;
    std::fs::create_dir_all(out_dir).map_err(|e| PipelineError::io(out_dir, e))?;

    let name = compiled_file_name(&input, minify).ok_or_else(|| PipelineError::Compile {
        path: input.clone(),
        reason: "input has no usable file name".to_string(),
    })?;
    let target = out_dir.join(name);

    if AssetKind::from_path(&input).is_binary() {
        std::fs::copy(&input, &target).map_err(|e| PipelineError::io(&target, e))?;
        debug!(input = %input.display(), output = %target.display(), "copied asset");
        return Ok(target);
    }

    let text = compiler.compile(&input)?;
    let mut text = filters.apply_for(&input, &[], text)?;
    if minify {
        text = Filter::new(FilterKind::Minify).apply(&text);
    }
    std::fs::write(&target, text).map_err(|e| PipelineError::io(&target, e))?;
    debug!(input = %input.display(), output = %target.display(), "compiled asset");
    Ok(target)
}
