//! Merge building blocks
//!
//! - `common_ancestors`: merge base discovery over the commit graph
//! - `diff3`: line-level three-way text merge
//! - `resolution`: per-path outcome of a three-way merge

pub mod common_ancestors;
pub mod diff3;
pub mod resolution;
