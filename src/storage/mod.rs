//! Storage module
//!
//! Byte-level access to the input and output roots.
//!
//! # Overview
//!
//! - `Storage` wraps any `object_store` backend behind a root prefix
//! - `GlobPattern` selects input files below a root

mod glob;
mod location;

pub use glob::GlobPattern;
pub use location::Storage;

#[cfg(test)]
mod tests;
