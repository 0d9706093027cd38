//! Locating the project and opening the asset pipeline.

use std::path::{Path, PathBuf};

use gloss_config::CONFIG_FILE;
use gloss_pipeline::AssetPipeline;
use tracing::debug;

use crate::GlobalArgs;

/// Walks up from `start` looking for a directory containing `gloss.toml`.
pub fn find_project_root(start: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(CONFIG_FILE).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(format!(
                "could not find {CONFIG_FILE} in {} or any parent directory",
                start.display()
            )
            .into());
        }
    }
}

/// Resolves the project root directory from global CLI args.
///
/// If `--config` is specified, uses that path (a file means its parent directory, a directory is used as is).
/// Otherwise walks up from the current directory looking for `gloss.toml`.
pub fn resolve_project_root(global: &GlobalArgs) -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Some(ref config_path) = global.config {
        let p = PathBuf::from(config_path);
        if p.is_file() {
            Ok(p.parent()
                .map(|p| p.to_path_buf())
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| PathBuf::from(".")))
        } else {
            Ok(p)
        }
    } else {
        let cwd = std::env::current_dir()?;
        find_project_root(&cwd)
    }
}

/// Loads the configuration, applies the `--mode` override and opens the pipeline.
pub fn open_pipeline(global: &GlobalArgs) -> Result<AssetPipeline, Box<dyn std::error::Error>> {
    let project_dir = std::path::absolute(resolve_project_root(global)?)?;
    debug!(project = %project_dir.display(), "loading configuration");
    let mut config = gloss_config::load_config(&project_dir)?;
    if let Some(mode) = global.mode {
        debug!(%mode, "mode overridden from the command line");
        config.mode = mode;
    }
    Ok(AssetPipeline::new(&config, &project_dir)?)
}
