//! Plumbing commands (low-level object operations)
//!
//! - `hash-object`: compute a blob id and optionally store it
//! - `cat-file`: pretty-print any object
//! - `ls-tree`: list the entries of a tree or a commit's tree
//! - `write-tree`: store the index as a tree

pub mod cat_file;
pub mod hash_object;
pub mod ls_tree;
pub mod write_tree;
