//! Staging index
//!
//! The on-disk map from working-tree paths to content hashes that becomes
//! the next commit's tree. Entries are kept sorted by path; a `children`
//! map mirrors the directory hierarchy so a path can be replaced by a
//! directory (or vice versa) without leaving stale entries behind.
//!
//! The file carries a trailing SHA-1 over everything before it, written
//! last, so readers reject a half-written index.

use crate::artifacts::core::GitError;
use crate::artifacts::index::checksum::Checksum;
use crate::artifacts::index::index_entry::{ENTRY_PREFIX_SIZE, IndexEntry};
use crate::artifacts::index::index_header::IndexHeader;
use crate::artifacts::index::{HEADER_SIZE, SIGNATURE, VERSION};
use crate::artifacts::objects::object::Packable;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::DerefMut;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct Index {
    /// Path to the index file (typically `.git/index`)
    path: Box<Path>,
    /// Tracked files by path, kept sorted
    entries: BTreeMap<Box<Path>, IndexEntry>,
    /// Directory hierarchy for parent/child conflict handling
    children: BTreeMap<Box<Path>, BTreeSet<Box<Path>>>,
    header: IndexHeader,
    /// Set when the in-memory state diverged from disk
    changed: bool,
}

impl Index {
    pub fn new(path: Box<Path>) -> Self {
        Index {
            path,
            entries: BTreeMap::new(),
            children: BTreeMap::new(),
            header: IndexHeader::new(String::from(SIGNATURE), VERSION, 0),
            changed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entry_by_path(&self, path: &Path) -> Option<&IndexEntry> {
        self.entries.get(path)
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.children.clear();
        self.header = IndexHeader::empty();
        self.changed = false;
    }

    /// Load the index from disk, verifying the checksum. A missing or
    /// empty file is an empty index.
    pub fn rehydrate(&mut self) -> anyhow::Result<()> {
        if !self.path().exists() {
            self.clear();
            std::fs::File::create(self.path())?;
        }

        let mut index_file = std::fs::OpenOptions::new().read(true).open(self.path())?;
        let mut lock = file_guard::lock(&mut index_file, file_guard::Lock::Shared, 0, 1)?;

        self.clear();

        if lock.deref_mut().metadata()?.len() == 0 {
            return Ok(());
        }

        let mut reader = Checksum::new(lock);
        let entries_count = self.parse_header(&mut reader)?;
        self.parse_entries(entries_count, &mut reader)?;

        reader.verify()
    }

    fn parse_header(&self, reader: &mut Checksum) -> anyhow::Result<u32> {
        let header_bytes = reader.read(HEADER_SIZE)?;
        let header = IndexHeader::parse(&header_bytes)?;

        if header.marker != SIGNATURE {
            return Err(GitError::Corrupt("index: bad signature".to_string()).into());
        }

        if header.version != VERSION {
            return Err(
                GitError::Unsupported(format!("index version {}", header.version)).into(),
            );
        }

        Ok(header.entries_count)
    }

    fn parse_entries(&mut self, entries_count: u32, reader: &mut Checksum) -> anyhow::Result<()> {
        for _ in 0..entries_count {
            let mut entry_bytes = reader.read(ENTRY_PREFIX_SIZE)?.to_vec();

            // the path runs to its NUL terminator
            loop {
                let byte = reader.read(1)?;
                entry_bytes.push(byte[0]);
                if byte[0] == 0 {
                    break;
                }
            }

            let entry = IndexEntry::parse(&entry_bytes)?;
            self.store_entry(&entry);
        }

        self.header.entries_count = entries_count;

        Ok(())
    }

    /// Drop entries the new entry makes impossible: a file entry at any of
    /// its parent paths, and any children if the entry replaces a
    /// directory.
    fn discard_conflicts(&mut self, entry: &IndexEntry) {
        for parent in entry.parent_dirs() {
            self.remove_entry(parent);
        }
        self.remove_children(entry.name.as_path());
    }

    fn store_entry(&mut self, entry: &IndexEntry) {
        self.entries
            .insert(entry.name.clone().into_boxed_path(), entry.clone());

        for parent in entry.parent_dirs() {
            self.children
                .entry(parent.to_path_buf().into_boxed_path())
                .or_default()
                .insert(entry.name.clone().into_boxed_path());
        }
    }

    fn remove_children(&mut self, path: &Path) {
        if let Some(children) = self.children.remove(path) {
            for child in children {
                self.remove_entry(&child);
            }
        }
    }

    fn remove_entry(&mut self, path: &Path) {
        let Some(entry) = self.entries.remove(path) else {
            return;
        };

        for parent in entry.parent_dirs() {
            if let Some(children) = self.children.get_mut(parent) {
                children.remove(path);
                if children.is_empty() {
                    self.children.remove(parent);
                }
            }
        }
    }

    /// Insert or replace the entry for a path
    pub fn add(&mut self, entry: IndexEntry) {
        self.discard_conflicts(&entry);
        self.store_entry(&entry);

        self.header.entries_count = self.entries.len() as u32;
        self.changed = true;
    }

    pub fn remove(&mut self, path: &Path) {
        self.remove_entry(path);
        self.remove_children(path);

        self.header.entries_count = self.entries.len() as u32;
        self.changed = true;
    }

    /// Write the index back: header, entries in path order, checksum last.
    /// Skipped when nothing diverged from the on-disk state.
    pub fn write_updates(&mut self) -> anyhow::Result<()> {
        if !self.changed {
            return Ok(());
        }

        let mut index_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(self.path())?;
        let lock = file_guard::lock(&mut index_file, file_guard::Lock::Exclusive, 0, 1)?;

        let mut writer = Checksum::new(lock);

        self.header = IndexHeader {
            entries_count: self.entries.len() as u32,
            ..self.header.clone()
        };
        writer.write(&self.header.serialize()?)?;

        for entry in self.entries() {
            writer.write(&entry.serialize()?)?;
        }

        writer.write_checksum()?;
        self.changed = false;

        Ok(())
    }

    /// Force the next `write_updates` even when no entry was touched.
    /// Rebuilding the index from scratch must land on disk whether or not
    /// the new state has any entries.
    pub fn mark_changed(&mut self) {
        self.changed = true;
    }

    pub fn entries(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.values()
    }

    /// Tracked paths at or under the given path (`.` means everything)
    pub fn entries_under_path(&self, path: &Path) -> Vec<PathBuf> {
        self.entries
            .keys()
            .filter(|entry_path| {
                path == Path::new(".")
                    || entry_path.starts_with(path)
                    || entry_path.as_ref() == path
            })
            .map(|p| p.to_path_buf())
            .collect()
    }
}
