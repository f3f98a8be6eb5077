//! Index entry representation
//!
//! One tracked file: its path, content hash, and the stat metadata that
//! lets change detection skip hashing when nothing moved.
//!
//! ## Entry layout
//!
//! A fixed 62-byte big-endian prefix (timestamps, dev/ino, mode, uid/gid,
//! size, 20-byte oid, 16-bit flags) followed by the NUL-terminated path.

use crate::artifacts::core::GitError;
use crate::artifacts::index::entry_mode::{EntryMode, FileMode};
use crate::artifacts::objects::object::Packable;
use crate::artifacts::objects::object_id::ObjectId;
use byteorder::{ByteOrder, WriteBytesExt};
use bytes::Bytes;
use derive_new::new;
use std::cmp::min;
use std::fs::Metadata;
use std::io::Write;
use std::os::unix::prelude::MetadataExt;
use std::path::{Path, PathBuf};

/// Path length cap recorded in the flags word
const MAX_PATH_SIZE: usize = 0xFFF;

/// Size of the fixed prefix preceding the path
pub const ENTRY_PREFIX_SIZE: usize = 62;

/// A tracked file in the staging index
#[derive(Debug, Clone, Default, new)]
pub struct IndexEntry {
    /// Path relative to the repository root
    pub name: PathBuf,
    /// SHA-1 of the staged content
    pub oid: ObjectId,
    /// Stat metadata captured when the entry was staged
    pub metadata: EntryMetadata,
}

impl IndexEntry {
    pub fn basename(&self) -> anyhow::Result<&str> {
        self.name
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| anyhow::anyhow!("invalid index entry name {:?}", self.name))
    }

    /// Ancestor directories from outermost to innermost, excluding the
    /// repository root itself
    pub fn parent_dirs(&self) -> Vec<&Path> {
        let mut dirs: Vec<&Path> = self
            .name
            .ancestors()
            .skip(1)
            .filter(|dir| !dir.as_os_str().is_empty())
            .collect();
        dirs.reverse();
        dirs
    }

    /// Cheap change check: size and mode
    pub fn stat_match(&self, other: &EntryMetadata) -> bool {
        (self.metadata.size == 0 || self.metadata.size == other.size)
            && self.metadata.mode == other.mode
    }

    /// Timestamp check: unchanged times mean the content was not touched
    pub fn times_match(&self, other: &EntryMetadata) -> bool {
        self.metadata.ctime == other.ctime
            && self.metadata.ctime_nsec == other.ctime_nsec
            && self.metadata.mtime == other.mtime
            && self.metadata.mtime_nsec == other.mtime_nsec
    }
}

impl PartialEq for IndexEntry {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for IndexEntry {}

impl PartialOrd for IndexEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for IndexEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.name.cmp(&other.name)
    }
}

/// Stat metadata stored alongside each entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryMetadata {
    pub ctime: i64,
    pub ctime_nsec: i64,
    pub mtime: i64,
    pub mtime_nsec: i64,
    pub dev: u64,
    pub ino: u64,
    pub mode: EntryMode,
    pub uid: u32,
    pub gid: u32,
    pub size: u64,
    pub flags: u32,
}

impl Packable for IndexEntry {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let entry_name = self
            .name
            .to_str()
            .ok_or_else(|| anyhow::anyhow!("invalid index entry name {:?}", self.name))?;

        let mut entry_bytes = Vec::with_capacity(ENTRY_PREFIX_SIZE + entry_name.len() + 1);
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.ctime as u32)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.ctime_nsec as u32)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.mtime as u32)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.mtime_nsec as u32)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.dev as u32)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.ino as u32)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.mode.as_u32())?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.uid)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.gid)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.size as u32)?;
        self.oid.write_raw_to(&mut entry_bytes)?;
        entry_bytes.write_u16::<byteorder::NetworkEndian>(self.metadata.flags as u16)?;
        entry_bytes.write_all(entry_name.as_bytes())?;
        entry_bytes.push(0);

        Ok(Bytes::from(entry_bytes))
    }
}

impl IndexEntry {
    /// Parse one entry from its on-disk bytes (prefix + path + NUL)
    pub fn parse(bytes: &[u8]) -> anyhow::Result<Self> {
        if bytes.len() < ENTRY_PREFIX_SIZE + 1 {
            return Err(GitError::Corrupt("index entry: truncated".to_string()).into());
        }

        let ctime = byteorder::NetworkEndian::read_u32(&bytes[0..4]) as i64;
        let ctime_nsec = byteorder::NetworkEndian::read_u32(&bytes[4..8]) as i64;
        let mtime = byteorder::NetworkEndian::read_u32(&bytes[8..12]) as i64;
        let mtime_nsec = byteorder::NetworkEndian::read_u32(&bytes[12..16]) as i64;
        let dev = byteorder::NetworkEndian::read_u32(&bytes[16..20]) as u64;
        let ino = byteorder::NetworkEndian::read_u32(&bytes[20..24]) as u64;
        let mode = EntryMode::try_from(byteorder::NetworkEndian::read_u32(&bytes[24..28]))?;
        let uid = byteorder::NetworkEndian::read_u32(&bytes[28..32]);
        let gid = byteorder::NetworkEndian::read_u32(&bytes[32..36]);
        let size = byteorder::NetworkEndian::read_u32(&bytes[36..40]) as u64;
        let oid = ObjectId::from_raw(&bytes[40..60])?;
        let flags = byteorder::NetworkEndian::read_u16(&bytes[60..62]) as u32;

        let name_end = bytes[ENTRY_PREFIX_SIZE..]
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| GitError::Corrupt("index entry: unterminated path".to_string()))?;
        let name_bytes = &bytes[ENTRY_PREFIX_SIZE..ENTRY_PREFIX_SIZE + name_end];
        let name = PathBuf::from(
            std::str::from_utf8(name_bytes)
                .map_err(|_| GitError::Corrupt("index entry: non-utf8 path".to_string()))?,
        );

        Ok(IndexEntry {
            name,
            oid,
            metadata: EntryMetadata {
                ctime,
                ctime_nsec,
                mtime,
                mtime_nsec,
                dev,
                ino,
                mode,
                uid,
                gid,
                size,
                flags,
            },
        })
    }
}

impl TryFrom<(&Path, Metadata)> for EntryMetadata {
    type Error = anyhow::Error;

    fn try_from((file_path, metadata): (&Path, Metadata)) -> Result<Self, Self::Error> {
        let mode = if metadata.file_type().is_symlink() {
            EntryMode::File(FileMode::Symlink)
        } else if metadata.is_dir() {
            EntryMode::Directory
        } else if metadata.mode() & 0o111 != 0 {
            EntryMode::File(FileMode::Executable)
        } else {
            EntryMode::File(FileMode::Regular)
        };

        let path_len = file_path
            .to_str()
            .ok_or_else(|| anyhow::anyhow!("invalid file path {file_path:?}"))?
            .len();

        Ok(Self {
            ctime: metadata.ctime(),
            ctime_nsec: metadata.ctime_nsec(),
            mtime: metadata.mtime(),
            mtime_nsec: metadata.mtime_nsec(),
            dev: metadata.dev(),
            ino: metadata.ino(),
            mode,
            uid: metadata.uid(),
            gid: metadata.gid(),
            size: metadata.size(),
            flags: min(path_len, MAX_PATH_SIZE) as u32,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};
    use sha1::Digest;

    #[fixture]
    fn oid() -> ObjectId {
        let mut hasher = sha1::Sha1::new();
        hasher.update("test data");
        ObjectId::try_parse(format!("{:x}", hasher.finalize())).unwrap()
    }

    #[fixture]
    fn metadata() -> EntryMetadata {
        EntryMetadata {
            mode: EntryMode::File(FileMode::Regular),
            size: 42,
            flags: 5,
            ..Default::default()
        }
    }

    #[rstest]
    fn parent_dirs_excludes_root_and_self(oid: ObjectId, metadata: EntryMetadata) {
        let entry = IndexEntry::new(PathBuf::from("a/b/c"), oid, metadata);

        assert_eq!(entry.parent_dirs(), vec![Path::new("a"), Path::new("a/b")]);
    }

    #[rstest]
    fn top_level_entry_has_no_parent_dirs(oid: ObjectId, metadata: EntryMetadata) {
        let entry = IndexEntry::new(PathBuf::from("a"), oid, metadata);

        assert_eq!(entry.parent_dirs(), Vec::<&Path>::new());
    }

    #[rstest]
    fn basename_is_final_component(oid: ObjectId, metadata: EntryMetadata) {
        let entry = IndexEntry::new(PathBuf::from("a/b/c"), oid, metadata);

        assert_eq!(entry.basename().unwrap(), "c");
    }

    #[rstest]
    fn entry_layout_is_prefix_path_nul(oid: ObjectId, metadata: EntryMetadata) {
        let entry = IndexEntry::new(PathBuf::from("a.txt"), oid.clone(), metadata);
        let bytes = entry.serialize().unwrap();

        assert_eq!(bytes.len(), ENTRY_PREFIX_SIZE + "a.txt".len() + 1);
        assert_eq!(bytes.last(), Some(&0u8));
        assert_eq!(&bytes[40..60], &oid.to_raw().unwrap()[..]);

        let parsed = IndexEntry::parse(&bytes).unwrap();
        assert_eq!(parsed.name, PathBuf::from("a.txt"));
        assert_eq!(parsed.oid, oid);
        assert_eq!(parsed.metadata.size, 42);
    }

    #[rstest]
    fn unterminated_path_is_corrupt(oid: ObjectId, metadata: EntryMetadata) {
        let entry = IndexEntry::new(PathBuf::from("a.txt"), oid, metadata);
        let bytes = entry.serialize().unwrap();

        assert!(IndexEntry::parse(&bytes[..bytes.len() - 1]).is_err());
    }
}
