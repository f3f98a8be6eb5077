//! Index file format
//!
//! The index (staging area) is the binary map from working-tree paths to
//! content hashes that becomes the next commit's tree.
//!
//! ## File layout (version 2)
//!
//! ```text
//! Header (12 bytes):
//!   - Signature: "DIRC" (4 bytes)
//!   - Version: 2 (big-endian u32)
//!   - Entry count (big-endian u32)
//!
//! Entries, sorted by path:
//!   - 62-byte fixed prefix (stat metadata, oid, flags), big-endian
//!   - NUL-terminated path
//!
//! Checksum (20 bytes):
//!   - SHA-1 over all preceding bytes
//! ```

pub mod checksum;
pub mod entry_mode;
pub mod index_entry;
pub mod index_header;

/// Size of the trailing SHA-1 checksum in bytes
pub const CHECKSUM_SIZE: usize = 20;

/// Size of the index header in bytes
pub const HEADER_SIZE: usize = 12;

/// Magic signature identifying index files
pub const SIGNATURE: &str = "DIRC";

/// Index file format version
pub const VERSION: u32 = 2;
