//! Turning a single input file into text for a bundle.

use std::path::Path;

use crate::error::PipelineError;

/// Produces the text an input contributes to a bundle.
///
/// The pipeline holds one compiler for script bundles and one for
/// stylesheet bundles, so a project can plug in a LESS or SCSS compiler
/// without touching the cache.
pub trait Compiler {
    /// Compiles the file at `path`.
    fn compile(&self, path: &Path) -> Result<String, PipelineError>;
}

/// Reads inputs verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConcatCompiler;

impl Compiler for ConcatCompiler {
    fn compile(&self, path: &Path) -> Result<String, PipelineError> {
        let bytes = std::fs::read(path).map_err(|e| PipelineError::io(path, e))?;
        String::from_utf8(bytes).map_err(|e| PipelineError::Compile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}
