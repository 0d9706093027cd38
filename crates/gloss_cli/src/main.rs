//! Gloss CLI: freshness checks and bundle builds for web assets.
//!
//! Provides `gloss check` to ask whether a bundle is up to date, `gloss build`
//! to rebuild it when stale and print its URL, `gloss compile` for one-off
//! compilation of a single asset, and `gloss clean` to drop the cache.

#![warn(missing_docs)]

mod build;
mod check;
mod clean;
mod compile;
mod project;

use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use gloss_common::Mode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Gloss: an incremental build cache for asset bundles.
#[derive(Parser, Debug)]
#[command(name = "gloss", version, about = "Gloss asset bundle cache")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a `gloss.toml` file or the directory containing it.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Override the mode set in `gloss.toml`.
    #[arg(long, global = true, value_enum)]
    pub mode: Option<ModeArg>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Report whether a bundle's cached artifact is fresh (exit 0) or stale (exit 1).
    Check(BundleArgs),
    /// Rebuild a bundle if stale and print its URL.
    Build(BundleArgs),
    /// Compile a single asset into a directory.
    Compile(CompileArgs),
    /// Remove all cached artifacts and the cache sidecar.
    Clean,
}

/// Arguments naming a bundle.
#[derive(Parser, Debug)]
pub struct BundleArgs {
    /// Output name, e.g. `css/site.css`.
    pub output: String,

    /// Input files, placeholder paths or `@asset` names.
    #[arg(required = true)]
    pub inputs: Vec<String>,
}

/// Arguments for the `gloss compile` subcommand.
#[derive(Parser, Debug)]
pub struct CompileArgs {
    /// The file to compile.
    pub input: String,

    /// Directory to write the result into (created if missing).
    pub out_dir: String,

    /// Write the result without minifying.
    #[arg(long)]
    pub no_minify: bool,
}

/// Mode selection on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Check freshness and persist cache state.
    Dev,
    /// Assume pre-built artifacts.
    Prod,
}

impl From<ModeArg> for Mode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Dev => Mode::Development,
            ModeArg::Prod => Mode::Production,
        }
    }
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Optional path to a config file or its directory.
    pub config: Option<String>,
    /// Mode override.
    pub mode: Option<Mode>,
}

impl GlobalArgs {
    /// The default log filter for these flags, used when `RUST_LOG` is unset.
    fn log_filter(&self) -> &'static str {
        if self.quiet {
            "warn"
        } else if self.verbose {
            "gloss=debug"
        } else {
            "gloss=info"
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
        mode: cli.mode.map(Mode::from),
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(global.log_filter()));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let result = match cli.command {
        Command::Check(ref args) => check::run(args, &global),
        Command::Build(ref args) => build::run(args, &global),
        Command::Compile(ref args) => compile::run(args, &global),
        Command::Clean => clean::run(&global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(2);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_check() {
        let cli = Cli::parse_from(["gloss", "check", "css/site.css", "a.scss", "@theme"]);
        match cli.command {
            Command::Check(ref args) => {
                assert_eq!(args.output, "css/site.css");
                assert_eq!(args.inputs, vec!["a.scss", "@theme"]);
            }
            _ => panic!("expected Check command"),
        }
    }

    #[test]
    fn bundle_commands_require_inputs() {
        assert!(Cli::try_parse_from(["gloss", "build", "app.js"]).is_err());
    }

    #[test]
    fn parse_compile_defaults_to_minify() {
        let cli = Cli::parse_from(["gloss", "compile", "site.scss", "web/css"]);
        match cli.command {
            Command::Compile(ref args) => {
                assert_eq!(args.input, "site.scss");
                assert_eq!(args.out_dir, "web/css");
                assert!(!args.no_minify);
            }
            _ => panic!("expected Compile command"),
        }
    }

    #[test]
    fn parse_compile_no_minify() {
        let cli = Cli::parse_from(["gloss", "compile", "app.js", "out", "--no-minify"]);
        match cli.command {
            Command::Compile(ref args) => assert!(args.no_minify),
            _ => panic!("expected Compile command"),
        }
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::parse_from([
            "gloss",
            "--quiet",
            "--mode",
            "prod",
            "--config",
            "/srv/site/gloss.toml",
            "clean",
        ]);
        assert!(cli.quiet);
        assert!(!cli.verbose);
        assert_eq!(cli.mode, Some(ModeArg::Prod));
        assert_eq!(cli.config.as_deref(), Some("/srv/site/gloss.toml"));
        assert!(matches!(cli.command, Command::Clean));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["gloss", "clean", "--verbose"]);
        assert!(cli.verbose);
    }

    #[test]
    fn mode_arg_converts() {
        assert_eq!(Mode::from(ModeArg::Dev), Mode::Development);
        assert_eq!(Mode::from(ModeArg::Prod), Mode::Production);
    }

    #[test]
    fn log_filter_follows_flags() {
        let mut global = GlobalArgs {
            quiet: false,
            verbose: false,
            config: None,
            mode: None,
        };
        assert_eq!(global.log_filter(), "gloss=info");
        global.verbose = true;
        assert_eq!(global.log_filter(), "gloss=debug");
        global.quiet = true;
        assert_eq!(global.log_filter(), "warn");
    }
}
