//! `gloss build`: rebuild a bundle if stale and print its URL.

use crate::project::open_pipeline;
use crate::{BundleArgs, GlobalArgs};

/// Runs the `gloss build` command.
///
/// In production mode only the production URL is printed; nothing is
/// checked or built.
pub fn run(args: &BundleArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let mut pipeline = open_pipeline(global)?;

    if pipeline.mode().is_production() {
        println!("{}", pipeline.prod_url(&args.output));
        return Ok(0);
    }

    let outcome = pipeline.ensure_built(&args.output, &args.inputs)?;
    if !global.quiet {
        let status = if outcome.rebuilt { "Built" } else { "Fresh" };
        eprintln!(
            "{status:>12} {} ({})",
            args.output,
            outcome.artifact.display()
        );
    }
    let url = pipeline.artifact_url(&outcome.artifact)?;
    pipeline.close();

    println!("{url}");
    Ok(0)
}
