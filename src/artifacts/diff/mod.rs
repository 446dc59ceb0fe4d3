//! Snapshot and content comparison
//!
//! - `toc_diff`: per-path classification across two or three snapshots
//! - `patch`: unified line patches between two versions of a file

pub mod patch;
pub mod toc_diff;
