//! Command implementations
//!
//! Every command is an async method on `Repository` that writes its report to the
//! repository writer:
//!
//! - `plumbing`: direct object access (hash-object, cat-file, ls-tree, write-tree)
//! - `porcelain`: version-control workflows (add, commit, checkout, merge, fetch, ...)

pub mod plumbing;
pub mod porcelain;
