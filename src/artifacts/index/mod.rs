//! Index file format
//!
//! ```text
//! Header (12 bytes):
//!   - Signature: "DIRC" (4 bytes)
//!   - Version: 2 (4 bytes)
//!   - Entry count (4 bytes)
//!
//! Entries (variable length):
//!   - Each entry padded to 8-byte alignment
//!   - Merge stage stored in bits 12-13 of the flags
//!
//! Checksum (20 bytes):
//!   - SHA-1 hash of all preceding bytes
//! ```

pub mod checksum;
pub mod index_entry;
pub mod index_header;

/// SHA-1 produces a 20-byte hash
pub const CHECKSUM_SIZE: usize = 20;

/// 4 bytes for the signature, 4 for the version, 4 for the entry count
pub const HEADER_SIZE: usize = 12;

pub const SIGNATURE: &str = "DIRC";

pub const VERSION: u32 = 2;
