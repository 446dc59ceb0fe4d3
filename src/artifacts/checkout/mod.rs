//! Working-copy migrations
//!
//! Moving the working copy and index from one snapshot to another (checkout, fast-forward,
//! applying a merge result) goes through a `Migration`. Every conflict with local state is
//! detected before anything is written, so a refused migration leaves the working copy
//! untouched.

pub mod conflict;
pub mod migration;
