//! Error types for configuration loading, validation and value resolution.

/// Errors that can occur when loading, validating or resolving a `gloss.toml` configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An I/O error occurred while reading the configuration file.
    #[error("failed to read configuration: {0}")]
    IoError(#[from] std::io::Error),

    /// The TOML content could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    /// A required field is missing from the configuration.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// A configuration value failed validation.
    #[error("validation error: {0}")]
    ValidationError(String),

    /// A path-like value did not resolve to an existing file or directory.
    #[error("the resource '{value}' could not be located")]
    ResourceNotFound {
        /// The value after placeholder substitution.
        value: String,
    },

    /// An `@name` reference names no configured asset.
    #[error("unknown asset '{0}'")]
    UnknownAsset(String),
}
