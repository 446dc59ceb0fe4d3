//! Repository areas
//!
//! Each area owns one piece of on-disk state:
//!
//! - `database`: the content-addressed object store under `objects/`
//! - `index`: the staging area, including conflict stages
//! - `refs`: `HEAD`, branches and remote-tracking refs
//! - `workspace`: the checked-out files of a non-bare repository
//! - `merge_marker`: `MERGE_HEAD` and `MERGE_MSG` while a merge is unconcluded
//! - `remote`: object and ref exchange with another repository
//! - `repository`: the handle tying the areas together

pub mod database;
pub mod index;
pub mod merge_marker;
pub mod refs;
pub mod remote;
pub mod repository;
pub mod workspace;
