//! Error types for cache operations.

use std::io;
use std::path::{Path, PathBuf};

/// Errors that can occur during cache operations.
///
/// Problems with transitive imports never surface here: an import that
/// cannot be resolved or read is treated as a leaf. Only direct bundle
/// inputs, the artifact itself and the sidecar produce errors.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// A file that must exist (typically a direct bundle input) is missing.
    #[error("resource not found: {path}")]
    ResourceNotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// A file exists but could not be read or stat'd.
    #[error("failed to read {path}: {source}")]
    ReadFailure {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },

    /// The sidecar or its directory could not be written.
    #[error("cache persistence error at {path}: {source}")]
    Persistence {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },

    /// The sidecar state could not be serialized.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Description of the serialization failure.
        reason: String,
    },

    /// A bundle id was queried that was never registered with the context.
    #[error("unknown bundle '{id}'")]
    UnknownBundle {
        /// The unregistered id.
        id: String,
    },
}

impl CacheError {
    /// Maps a read-side I/O error, turning `NotFound` into [`CacheError::ResourceNotFound`].
    pub(crate) fn from_read(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            Self::ResourceNotFound {
                path: path.to_path_buf(),
            }
        } else {
            Self::ReadFailure {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    /// Maps a write-side I/O error.
    pub(crate) fn persistence(path: &Path, source: io::Error) -> Self {
        Self::Persistence {
            path: path.to_path_buf(),
            source,
        }
    }
}
