//! Content-addressed objects
//!
//! Three kinds of object exist:
//!
//! - **Blob**: raw file content
//! - **Tree**: one directory level, entries ordered by name
//! - **Commit**: a tree snapshot plus parents, identities and a message
//!
//! Every object serializes to `<type> <size>\0<payload>` and is identified by the SHA-1 of
//! that serialization.

pub mod blob;
pub mod commit;
pub mod object;
pub mod object_id;
pub mod object_type;
pub mod tree;

/// Length of a SHA-1 hash in hexadecimal format
pub const OBJECT_ID_LENGTH: usize = 40;

/// Shortest prefix accepted when resolving abbreviated object ids
pub const MIN_ABBREVIATED_LENGTH: usize = 4;
