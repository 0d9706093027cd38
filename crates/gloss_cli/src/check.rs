//! `gloss check`: report whether a bundle is fresh.

use crate::project::open_pipeline;
use crate::{BundleArgs, GlobalArgs};

/// Runs the `gloss check` command.
///
/// Prints `fresh` or `stale` on stdout. Returns exit code 0 when fresh and
/// 1 when stale.
pub fn run(args: &BundleArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let mut pipeline = open_pipeline(global)?;
    let fresh = pipeline.check(&args.output, &args.inputs)?;
    pipeline.close();

    println!("{}", if fresh { "fresh" } else { "stale" });
    Ok(if fresh { 0 } else { 1 })
}
