//! Error types for filters and bundle building.

use std::path::PathBuf;

use gloss_cache::CacheError;
use gloss_config::ConfigError;

/// Errors raised while configuring or looking up filters.
#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    /// A bundle or asset named a filter that is not configured.
    #[error("unknown filter '{0}'")]
    UnknownFilter(String),

    /// An option key is not recognized by the filter kind.
    #[error("filter '{filter}' has no option '{key}'")]
    UnknownOption {
        /// Configured filter name.
        filter: String,
        /// The offending option key as written.
        key: String,
    },

    /// An option value has the wrong type or an unusable value.
    #[error("could not set option '{key}' of filter '{filter}' to {value}: {reason}")]
    InvalidOption {
        /// Configured filter name.
        filter: String,
        /// The option key as written.
        key: String,
        /// The rejected value, rendered as TOML.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// The `apply_to` pattern does not compile.
    #[error("filter '{filter}' has invalid apply_to pattern: {reason}")]
    InvalidPattern {
        /// Configured filter name.
        filter: String,
        /// The regex compile error.
        reason: String,
    },
}

/// Errors that can occur while resolving, checking or building a bundle.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The freshness cache failed.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Configuration or input resolution failed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A filter could not be built or found.
    #[error(transparent)]
    Filter(#[from] FilterError),

    /// The output's extension is neither `js` nor `css`.
    #[error("unknown asset type '{0}' given")]
    UnknownAssetType(String),

    /// An input could not be compiled.
    #[error("failed to compile {path}: {reason}")]
    Compile {
        /// The input being compiled.
        path: PathBuf,
        /// Description of the failure.
        reason: String,
    },

    /// Reading an input or writing an artifact failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

impl PipelineError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
