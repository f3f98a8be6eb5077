//! Object identifier (SHA-1 content address)
//!
//! Object IDs are 40-character lowercase hex strings in memory and 20 raw
//! bytes inside tree entries, index entries, and packfiles. They name every
//! object in the store: any change to an object's canonical serialization
//! yields a different ID.
//!
//! Objects live at `.git/objects/<first-2-chars>/<remaining-38-chars>`.

use crate::artifacts::core::GitError;
use crate::artifacts::objects::{OBJECT_ID_LENGTH, OBJECT_ID_RAW_LENGTH};
use std::io;
use std::path::PathBuf;

/// SHA-1 content address of an object
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct ObjectId(String);

impl ObjectId {
    /// Parse and validate an object ID from its hex form
    pub fn try_parse(id: String) -> anyhow::Result<Self> {
        if id.len() != OBJECT_ID_LENGTH {
            return Err(GitError::Corrupt(format!("object id of length {}", id.len())).into());
        }
        if !id.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(GitError::Corrupt(format!("object id {id}")).into());
        }
        Ok(Self(id.to_ascii_lowercase()))
    }

    /// Build an object ID from its 20-byte raw form
    pub fn from_raw(raw: &[u8]) -> anyhow::Result<Self> {
        if raw.len() != OBJECT_ID_RAW_LENGTH {
            return Err(GitError::Corrupt(format!("raw object id of length {}", raw.len())).into());
        }

        let mut hex = String::with_capacity(OBJECT_ID_LENGTH);
        for byte in raw {
            hex.push_str(&format!("{byte:02x}"));
        }
        Ok(Self(hex))
    }

    /// The 20-byte raw form used in tree entries, index entries, and packs
    pub fn to_raw(&self) -> anyhow::Result<[u8; OBJECT_ID_RAW_LENGTH]> {
        let mut raw = [0u8; OBJECT_ID_RAW_LENGTH];
        for (i, chunk) in raw.iter_mut().enumerate() {
            *chunk = u8::from_str_radix(&self.0[2 * i..2 * i + 2], 16)
                .map_err(|_| GitError::Corrupt(format!("object id {}", self.0)))?;
        }
        Ok(raw)
    }

    /// Write the raw form to the given writer
    pub fn write_raw_to<W: io::Write>(&self, writer: &mut W) -> anyhow::Result<()> {
        writer.write_all(&self.to_raw()?)?;
        Ok(())
    }

    /// Read an object ID from its raw form
    pub fn read_raw_from<R: io::Read + ?Sized>(reader: &mut R) -> anyhow::Result<Self> {
        let mut raw = [0u8; OBJECT_ID_RAW_LENGTH];
        reader.read_exact(&mut raw)?;
        Self::from_raw(&raw)
    }

    /// The object's storage path, `XX/YYYY…` with the first two hex chars
    /// as the directory name
    pub fn to_path(&self) -> PathBuf {
        let (dir, file) = self.0.split_at(2);
        PathBuf::from(dir).join(file)
    }

    /// Abbreviated form (first 7 characters)
    pub fn to_short_oid(&self) -> String {
        self.0.split_at(7).0.to_string()
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("3b18e512dba79e4c8300dd08aeb37f8e728b8dad")]
    #[case("DA39A3EE5E6B4B0D3255BFEF95601890AFD80709")]
    fn accepts_forty_hex_chars(#[case] hex: &str) {
        let oid = ObjectId::try_parse(hex.to_string()).unwrap();
        assert_eq!(oid.as_ref(), hex.to_ascii_lowercase());
    }

    #[rstest]
    #[case("3b18e512")]
    #[case("zz18e512dba79e4c8300dd08aeb37f8e728b8dad")]
    #[case("")]
    fn rejects_malformed_ids(#[case] hex: &str) {
        assert!(ObjectId::try_parse(hex.to_string()).is_err());
    }

    #[test]
    fn raw_round_trip() {
        let oid =
            ObjectId::try_parse("3b18e512dba79e4c8300dd08aeb37f8e728b8dad".to_string()).unwrap();
        let raw = oid.to_raw().unwrap();
        assert_eq!(raw[0], 0x3b);
        assert_eq!(raw[19], 0xad);
        assert_eq!(ObjectId::from_raw(&raw).unwrap(), oid);
    }

    #[test]
    fn storage_path_splits_first_two_chars() {
        let oid =
            ObjectId::try_parse("3b18e512dba79e4c8300dd08aeb37f8e728b8dad".to_string()).unwrap();
        assert_eq!(
            oid.to_path(),
            PathBuf::from("3b").join("18e512dba79e4c8300dd08aeb37f8e728b8dad")
        );
    }
}
