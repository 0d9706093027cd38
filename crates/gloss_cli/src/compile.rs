//! `gloss compile`: one-off compilation of a single asset.

use std::path::Path;

use crate::project::open_pipeline;
use crate::{CompileArgs, GlobalArgs};

/// Runs the `gloss compile` command, printing the written path.
pub fn run(args: &CompileArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let pipeline = open_pipeline(global)?;
    let written = pipeline.compile_asset(
        Path::new(&args.input),
        Path::new(&args.out_dir),
        !args.no_minify,
    )?;
    pipeline.close();

    if !global.quiet {
        eprintln!("{:>12} {}", "Compiled", args.input);
    }
    println!("{}", written.display());
    Ok(0)
}
