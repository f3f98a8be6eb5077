//! Packfile codec
//!
//! A pack bundles many objects for transfer:
//!
//! ```text
//! "PACK" | version 2 (u32 BE) | object count (u32 BE)
//! <count> objects
//! SHA-1 over everything above (20 bytes)
//! ```
//!
//! Each object starts with a variable-length header whose first byte packs
//! a continuation bit (7), a 3-bit type (6-4), and the low 4 bits of the
//! inflated size; continuation bytes add 7 size bits each, later bytes more
//! significant. Plain objects follow with a zlib stream. Deltified objects
//! name their base by pack-relative offset (`ofs-delta`) or by 20-byte
//! hash (`ref-delta`) and carry a zlib-compressed reconstruction recipe.
//!
//! - `delta`: size/offset varints and COPY/ADD application
//! - `reader`: streaming pack parse with chained delta resolution
//! - `writer`: pack assembly (plain objects, no delta compression)

pub mod delta;
pub mod reader;
pub mod writer;

use crate::artifacts::core::GitError;
use crate::artifacts::objects::object_type::ObjectType;

/// Pack signature bytes
pub const SIGNATURE: &[u8; 4] = b"PACK";

/// Supported pack format version
pub const VERSION: u32 = 2;

/// Size of the pack header in bytes
pub const HEADER_SIZE: usize = 12;

/// Size of the trailing SHA-1 checksum in bytes
pub const CHECKSUM_SIZE: usize = 20;

/// Object kind tags used in pack object headers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackObjectType {
    Commit = 1,
    Tree = 2,
    Blob = 3,
    Tag = 4,
    OfsDelta = 6,
    RefDelta = 7,
}

impl PackObjectType {
    /// The stored object kind for a plain pack entry. Tags are recognized
    /// in the header but have no storable counterpart here.
    pub fn as_object_type(&self) -> anyhow::Result<ObjectType> {
        match self {
            PackObjectType::Commit => Ok(ObjectType::Commit),
            PackObjectType::Tree => Ok(ObjectType::Tree),
            PackObjectType::Blob => Ok(ObjectType::Blob),
            PackObjectType::Tag => {
                Err(GitError::Unsupported("pack object type 4 (tag)".to_string()).into())
            }
            PackObjectType::OfsDelta | PackObjectType::RefDelta => Err(GitError::Corrupt(
                "pack: delta entry where a plain object was expected".to_string(),
            )
            .into()),
        }
    }
}

impl From<ObjectType> for PackObjectType {
    fn from(object_type: ObjectType) -> Self {
        match object_type {
            ObjectType::Commit => PackObjectType::Commit,
            ObjectType::Tree => PackObjectType::Tree,
            ObjectType::Blob => PackObjectType::Blob,
        }
    }
}

impl TryFrom<u8> for PackObjectType {
    type Error = anyhow::Error;

    fn try_from(value: u8) -> anyhow::Result<Self> {
        match value {
            1 => Ok(PackObjectType::Commit),
            2 => Ok(PackObjectType::Tree),
            3 => Ok(PackObjectType::Blob),
            4 => Ok(PackObjectType::Tag),
            6 => Ok(PackObjectType::OfsDelta),
            7 => Ok(PackObjectType::RefDelta),
            other => Err(GitError::Unsupported(format!("pack object type {other}")).into()),
        }
    }
}
