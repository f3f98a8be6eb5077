//! Tree object
//!
//! Trees are directory snapshots: an ordered sequence of
//! `(mode, name, oid)` entries, one per file or subdirectory.
//!
//! On disk: `tree <size>\0` followed by `<mode> <name>\0<20-byte-oid>` per
//! entry. The mode is decimal-octal ASCII with no leading zero (`40000`
//! for directories), and entries are sorted by name with directory names
//! ordered as `name/`, which is what makes the hash canonical.
//!
//! A tree is either *built* from index entries (write path) or *loaded*
//! from the database (read path); an empty directory is never represented,
//! it simply does not appear in any tree.

use crate::artifacts::core::GitError;
use crate::artifacts::database::database_entry::DatabaseEntry;
use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::objects::object::Unpackable;
use crate::artifacts::objects::object::{Object, Packable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use std::path::Path;

/// A node being assembled while building a tree from the index
#[derive(Debug, Clone)]
enum TreeEntry {
    File(IndexEntry),
    Directory(Tree),
}

impl TreeEntry {
    fn object_type(&self) -> ObjectType {
        match self {
            TreeEntry::File(_) => ObjectType::Blob,
            TreeEntry::Directory(_) => ObjectType::Tree,
        }
    }

    fn mode(&self) -> EntryMode {
        match self {
            TreeEntry::File(entry) => entry.metadata.mode,
            TreeEntry::Directory(_) => EntryMode::Directory,
        }
    }

    fn oid(&self) -> anyhow::Result<ObjectId> {
        match self {
            TreeEntry::File(entry) => Ok(entry.oid.clone()),
            TreeEntry::Directory(tree) => tree.object_id(),
        }
    }
}

/// Directory snapshot
///
/// `build_entries` holds the write-side hierarchy assembled from index
/// entries; directory keys carry a trailing `/` so the map's order matches
/// the canonical tree sort. `loaded_entries` holds the flat read-side view
/// produced by deserialization.
#[derive(Debug, Clone, Default)]
pub struct Tree {
    build_entries: BTreeMap<String, TreeEntry>,
    loaded_entries: BTreeMap<String, DatabaseEntry>,
}

impl Tree {
    /// Assemble a tree hierarchy from flat index entries, synthesizing a
    /// directory node for every ancestor.
    pub fn build<'e>(entries: impl Iterator<Item = &'e IndexEntry>) -> anyhow::Result<Self> {
        let mut root = Self::default();

        for entry in entries {
            let parents = entry.parent_dirs();
            root.add_entry(&parents, entry)?;
        }

        Ok(root)
    }

    /// Post-order traversal: children before parents, so child oids exist
    /// by the time the parent is stored.
    pub fn traverse<F>(&self, func: &F) -> anyhow::Result<()>
    where
        F: Fn(&Tree) -> anyhow::Result<()>,
    {
        for entry in self.build_entries.values() {
            if let TreeEntry::Directory(tree) = entry {
                tree.traverse(func)?;
            }
        }
        func(self)
    }

    fn add_entry(&mut self, parents: &[&Path], entry: &IndexEntry) -> anyhow::Result<()> {
        if parents.is_empty() {
            self.build_entries
                .insert(entry.basename()?.to_string(), TreeEntry::File(entry.clone()));
            return Ok(());
        }

        let dir_name = parents[0]
            .file_name()
            .and_then(|name| name.to_str())
            .context("invalid directory name in index entry")?;
        let key = format!("{dir_name}/");

        let subtree = match self
            .build_entries
            .entry(key)
            .or_insert_with(|| TreeEntry::Directory(Tree::default()))
        {
            TreeEntry::Directory(tree) => tree,
            TreeEntry::File(_) => {
                anyhow::bail!("index entry path collides with file {dir_name}")
            }
        };
        subtree.add_entry(&parents[1..], entry)
    }

    /// Entries loaded from the database, in name order
    pub fn entries(&self) -> impl Iterator<Item = (&String, &DatabaseEntry)> {
        self.loaded_entries.iter()
    }

    pub fn into_entries(self) -> impl Iterator<Item = (String, DatabaseEntry)> {
        self.loaded_entries.into_iter()
    }
}

impl Packable for Tree {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut content_bytes = Vec::new();

        for (name, entry) in &self.build_entries {
            let name = name.trim_end_matches('/');
            content_bytes.write_all(format!("{} {}", entry.mode().as_str(), name).as_bytes())?;
            content_bytes.push(0);
            entry.oid()?.write_raw_to(&mut content_bytes)?;
        }

        let mut tree_bytes = Vec::with_capacity(content_bytes.len() + 16);
        let header = format!("{} {}\0", self.object_type().as_str(), content_bytes.len());
        tree_bytes.write_all(header.as_bytes())?;
        tree_bytes.write_all(&content_bytes)?;

        Ok(Bytes::from(tree_bytes))
    }
}

impl Unpackable for Tree {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        let mut entries = BTreeMap::new();
        let mut reader = reader;

        let mut mode_bytes = Vec::new();
        let mut name_bytes = Vec::new();

        loop {
            mode_bytes.clear();
            let n = reader.read_until(b' ', &mut mode_bytes)?;
            if n == 0 {
                break; // clean EOF: no more entries
            }
            if mode_bytes.pop() != Some(b' ') {
                return Err(GitError::Corrupt("tree entry: truncated mode".to_string()).into());
            }

            let mode_str = std::str::from_utf8(&mode_bytes)
                .map_err(|_| GitError::Corrupt("tree entry: non-utf8 mode".to_string()))?;
            let mode = EntryMode::from_octal_str(mode_str)?;

            name_bytes.clear();
            let n = reader.read_until(b'\0', &mut name_bytes)?;
            if n == 0 || name_bytes.pop() != Some(b'\0') {
                return Err(GitError::Corrupt("tree entry: truncated name".to_string()).into());
            }
            let name = std::str::from_utf8(&name_bytes)
                .map_err(|_| GitError::Corrupt("tree entry: non-utf8 name".to_string()))?
                .to_owned();

            let oid = ObjectId::read_raw_from(&mut reader)
                .map_err(|_| GitError::Corrupt("tree entry: truncated object id".to_string()))?;

            entries.insert(name, DatabaseEntry::new(oid, mode));
        }

        Ok(Tree {
            build_entries: BTreeMap::new(),
            loaded_entries: entries,
        })
    }
}

impl Object for Tree {
    fn object_type(&self) -> ObjectType {
        ObjectType::Tree
    }

    fn display(&self) -> String {
        self.loaded_entries
            .iter()
            .map(|(name, entry)| {
                let object_type = if entry.is_tree() {
                    ObjectType::Tree
                } else {
                    ObjectType::Blob
                };
                format!(
                    "{} {} {}\t{}",
                    entry.mode.as_display_str(),
                    object_type.as_str(),
                    entry.oid.as_ref(),
                    name
                )
            })
            .collect::<Vec<String>>()
            .join("\n")
    }
}
