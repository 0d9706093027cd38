//! `gloss clean`: remove built artifacts and the cache sidecar.

use crate::project::open_pipeline;
use crate::GlobalArgs;

/// Runs the `gloss clean` command.
pub fn run(global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let pipeline = open_pipeline(global)?;
    let cache_dir = pipeline.resolver().paths().cache_dir.clone();
    let removed = pipeline.clean()?;

    if !global.quiet {
        if removed {
            eprintln!("{:>12} {}", "Removed", cache_dir.join("gloss").display());
        } else {
            eprintln!("{:>12} nothing to clean", "Clean");
        }
    }
    Ok(0)
}
