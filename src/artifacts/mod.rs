//! Values and algorithms flowing between repository areas
//!
//! - `branch`: branch names and revision parsing
//! - `checkout`: working-copy migrations and their conflict reports
//! - `diff`: TOC classification and unified patches
//! - `index`: on-disk index format
//! - `merge`: merge base discovery and diff3 text merging
//! - `objects`: blob, tree and commit objects
//! - `status`: local change inspection

pub mod branch;
pub mod checkout;
pub mod diff;
pub mod index;
pub mod merge;
pub mod objects;
pub mod status;
