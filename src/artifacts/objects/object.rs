//! Core object traits
//!
//! All objects share one canonical serialization:
//!
//! ```text
//! <type> <size>\0<payload>
//! ```
//!
//! The SHA-1 of those bytes is the object's name, so serialization and
//! identity are inseparable: `Packable` produces the canonical bytes,
//! `Object::object_id` hashes them, and the database compresses them to
//! disk under the resulting address.

use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::Tree;
use anyhow::Result;
use bytes::Bytes;
use sha1::{Digest, Sha1};
use std::io::BufRead;
use std::path::PathBuf;

/// Serialization to the canonical framed format (header included)
pub trait Packable {
    fn serialize(&self) -> Result<Bytes>;
}

/// Deserialization from the canonical format (header already consumed)
pub trait Unpackable {
    fn deserialize(reader: impl BufRead) -> Result<Self>
    where
        Self: Sized;
}

/// Common object operations: identity and display
pub trait Object: Packable {
    fn object_type(&self) -> ObjectType;

    /// Human-readable rendering used by `cat-file -p`
    fn display(&self) -> String;

    /// The object's content address: SHA-1 over the canonical serialization
    fn object_id(&self) -> Result<ObjectId> {
        let content = self.serialize()?;
        let mut hasher = Sha1::new();
        hasher.update(&content);

        let oid = hasher.finalize();
        ObjectId::try_parse(format!("{oid:x}"))
    }

    /// Storage path relative to the objects directory
    fn object_path(&self) -> Result<PathBuf> {
        Ok(self.object_id()?.to_path())
    }
}

/// Type-erased object container for callers that dispatch on the tag
pub enum ObjectBox {
    Blob(Box<Blob>),
    Tree(Box<Tree>),
    Commit(Box<Commit>),
}

impl ObjectBox {
    pub fn object_type(&self) -> ObjectType {
        match self {
            ObjectBox::Blob(_) => ObjectType::Blob,
            ObjectBox::Tree(_) => ObjectType::Tree,
            ObjectBox::Commit(_) => ObjectType::Commit,
        }
    }
}
