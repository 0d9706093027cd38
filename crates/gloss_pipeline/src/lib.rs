//! Bundle building on top of the freshness cache.
//!
//! [`AssetPipeline`] turns a requested output and its inputs into a URL,
//! rebuilding the cached artifact only when the cache reports it stale.
//! Inputs pass through a [`Compiler`] and the configured [`filter`]s;
//! [`compile_asset`] handles one-off compilation of a single file.

#![warn(missing_docs)]

pub mod compile;
pub mod compiler;
pub mod error;
pub mod filter;
pub mod pipeline;

pub use compile::{compile_asset, compiled_file_name};
pub use compiler::{Compiler, ConcatCompiler};
pub use error::{FilterError, PipelineError};
pub use filter::{Filter, FilterSet, NamedFilter};
pub use pipeline::{AssetPipeline, BuildOutcome};
