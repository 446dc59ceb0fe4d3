//! twig: a content-addressed version-control engine
//!
//! The crate is split the same way the on-disk repository is:
//!
//! - `areas`: the stateful parts of a repository (object database, index, refs, workspace,
//!   merge state and remote stores) plus the `Repository` handle that owns them
//! - `artifacts`: the values and algorithms flowing between areas (objects, TOC diffs,
//!   text merging, checkout migrations, revision parsing)
//! - `commands`: plumbing and porcelain operations implemented on `Repository`
//! - `errors`: the domain error taxonomy surfaced to callers

pub mod areas;
pub mod artifacts;
pub mod commands;
pub mod errors;
