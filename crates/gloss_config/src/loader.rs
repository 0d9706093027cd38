//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::GlossConfig;
use regex::RegexBuilder;
use std::path::Path;

/// Name of the configuration file looked up in a project directory.
pub const CONFIG_FILE: &str = "gloss.toml";

/// Loads and validates a `gloss.toml` configuration from a project directory.
///
/// Reads `<project_dir>/gloss.toml`, parses it, and validates required fields.
pub fn load_config(project_dir: &Path) -> Result<GlossConfig, ConfigError> {
    let config_path = project_dir.join(CONFIG_FILE);
    let content = std::fs::read_to_string(&config_path)?;
    load_config_from_str(&content)
}

/// Parses and validates a `gloss.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<GlossConfig, ConfigError> {
    let config: GlossConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates that required fields are present and cross-references resolve.
fn validate_config(config: &GlossConfig) -> Result<(), ConfigError> {
    if config.paths.cache_dir.trim().is_empty() {
        return Err(ConfigError::MissingField("paths.cache_dir".to_string()));
    }
    if !config.paths.dev_prefix.starts_with('/') {
        return Err(ConfigError::ValidationError(format!(
            "paths.dev_prefix '{}' must start with '/'",
            config.paths.dev_prefix
        )));
    }

    for (name, asset) in &config.assets {
        if asset.inputs.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "asset '{name}' has no inputs"
            )));
        }
        for filter in &asset.filters {
            if !config.filters.contains_key(filter) {
                return Err(ConfigError::ValidationError(format!(
                    "asset '{name}' uses undefined filter '{filter}'"
                )));
            }
        }
    }

    for (name, filter) in &config.filters {
        if let Some(pattern) = &filter.apply_to {
            RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map_err(|e| {
                    ConfigError::ValidationError(format!(
                        "filter '{name}' has invalid apply_to pattern: {e}"
                    ))
                })?;
        }
    }
    Ok(())
}
