//! Working tree status inspection
//!
//! `local_changes` compares the three snapshots a repository holds at any time (HEAD, the
//! index and the working copy) and reports what is staged, unstaged, untracked and
//! unmerged. Status output and the checkout/merge safety checks both build on it.

pub mod local_changes;
