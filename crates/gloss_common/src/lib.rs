//! Shared foundational types used across the Gloss asset cache.
//!
//! This crate provides content hashing for bundle identity, whole-second
//! modification times, the operating mode, and classification of asset
//! files by extension.

#![warn(missing_docs)]

pub mod hash;
pub mod kind;
pub mod mode;
pub mod mtime;

pub use hash::ContentHash;
pub use kind::{AssetKind, StyleDialect};
pub use mode::Mode;
pub use mtime::ModTime;
