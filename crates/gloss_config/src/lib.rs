//! Parsing and validation of `gloss.toml` configuration files.
//!
//! This crate reads the configuration file into a strongly-typed
//! [`GlossConfig`] and resolves path placeholders and named asset references
//! into concrete input files.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE};
pub use resolve::{PathResolver, ResolvedBundle, ResolvedPaths};
pub use types::*;
