//! Content-addressed object store
//!
//! Objects are zlib-compressed under `.git/objects/ab/cdef123...`, the
//! first two hex chars of the SHA-1 naming the directory. Writes go to a
//! temp file first and land by rename, so a reader never observes a
//! partial object; re-storing existing content is a no-op because the same
//! bytes map to the same path.

use crate::artifacts::core::GitError;
use crate::artifacts::database::database_entry::DatabaseEntry;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object::{Object, ObjectBox, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::Tree;
use anyhow::Context;
use bytes::Bytes;
use sha1::{Digest, Sha1};
use std::collections::BTreeSet;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct Database {
    /// Path to the objects directory (typically `.git/objects`)
    path: Box<Path>,
}

impl Database {
    pub fn new(path: Box<Path>) -> Self {
        Database { path }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self, object_id: &ObjectId) -> bool {
        self.path.join(object_id.to_path()).exists()
    }

    /// Store a typed object, returning its address. A no-op when the
    /// object already exists.
    pub fn store(&self, object: impl Object) -> anyhow::Result<ObjectId> {
        let object_id = object.object_id()?;
        self.write_if_absent(&object_id, object.serialize()?)?;

        Ok(object_id)
    }

    /// Store a raw payload under the given kind, framing and hashing it.
    /// This is the pack reader's entry point: it has bytes, not typed
    /// objects.
    pub fn store_bytes(&self, object_type: ObjectType, payload: Bytes) -> anyhow::Result<ObjectId> {
        let mut content = Vec::with_capacity(payload.len() + 16);
        content.write_all(format!("{} {}\0", object_type.as_str(), payload.len()).as_bytes())?;
        content.write_all(&payload)?;

        let digest = Sha1::digest(&content);
        let object_id = ObjectId::try_parse(format!("{digest:x}"))?;

        self.write_if_absent(&object_id, Bytes::from(content))?;

        Ok(object_id)
    }

    /// Load an object's kind and payload (header validated and stripped)
    pub fn read_raw(&self, object_id: &ObjectId) -> anyhow::Result<(ObjectType, Bytes)> {
        let content = self.load(object_id)?;
        let mut reader = Cursor::new(&content);

        let (object_type, size) = ObjectType::parse_header(&mut reader)?;
        let payload = content.slice(reader.position() as usize..);

        if payload.len() != size {
            return Err(GitError::Corrupt(format!(
                "object {object_id}: header size {size} but payload is {} bytes",
                payload.len()
            ))
            .into());
        }

        Ok((object_type, payload))
    }

    /// Parse an object into its typed representation
    pub fn parse_object(&self, object_id: &ObjectId) -> anyhow::Result<ObjectBox> {
        let (object_type, payload) = self.read_raw(object_id)?;
        let reader = Cursor::new(payload);

        match object_type {
            ObjectType::Blob => Ok(ObjectBox::Blob(Box::new(Blob::deserialize(reader)?))),
            ObjectType::Tree => Ok(ObjectBox::Tree(Box::new(Tree::deserialize(reader)?))),
            ObjectType::Commit => Ok(ObjectBox::Commit(Box::new(Commit::deserialize(reader)?))),
        }
    }

    pub fn parse_object_as_blob(&self, object_id: &ObjectId) -> anyhow::Result<Blob> {
        match self.parse_object(object_id)? {
            ObjectBox::Blob(blob) => Ok(*blob),
            other => Err(GitError::Corrupt(format!(
                "object {object_id} is a {}, expected a blob",
                other.object_type()
            ))
            .into()),
        }
    }

    pub fn parse_object_as_tree(&self, object_id: &ObjectId) -> anyhow::Result<Tree> {
        match self.parse_object(object_id)? {
            ObjectBox::Tree(tree) => Ok(*tree),
            other => Err(GitError::Corrupt(format!(
                "object {object_id} is a {}, expected a tree",
                other.object_type()
            ))
            .into()),
        }
    }

    pub fn parse_object_as_commit(&self, object_id: &ObjectId) -> anyhow::Result<Commit> {
        match self.parse_object(object_id)? {
            ObjectBox::Commit(commit) => Ok(*commit),
            other => Err(GitError::Corrupt(format!(
                "object {object_id} is a {}, expected a commit",
                other.object_type()
            ))
            .into()),
        }
    }

    /// Flatten a tree into `path -> (oid, mode)` for every file it
    /// reaches, recursing through subtrees.
    pub fn load_flat_tree(
        &self,
        tree_oid: &ObjectId,
    ) -> anyhow::Result<std::collections::BTreeMap<PathBuf, DatabaseEntry>> {
        let mut entries = std::collections::BTreeMap::new();
        self.flatten_tree(tree_oid, &PathBuf::new(), &mut entries)?;
        Ok(entries)
    }

    fn flatten_tree(
        &self,
        tree_oid: &ObjectId,
        prefix: &Path,
        entries: &mut std::collections::BTreeMap<PathBuf, DatabaseEntry>,
    ) -> anyhow::Result<()> {
        let tree = self.parse_object_as_tree(tree_oid)?;

        for (name, entry) in tree.entries() {
            let path = prefix.join(name);
            if entry.is_tree() {
                self.flatten_tree(&entry.oid, &path, entries)?;
            } else {
                entries.insert(path, entry.clone());
            }
        }

        Ok(())
    }

    /// Every object reachable from `start`: commits pull in their parents
    /// and tree, trees their entries. The full closure, blobs included, is
    /// what push needs to compute the objects a remote is missing.
    pub fn reachable_objects(&self, start: &ObjectId) -> anyhow::Result<BTreeSet<ObjectId>> {
        let mut reachable = BTreeSet::new();
        let mut queue = vec![start.clone()];

        while let Some(object_id) = queue.pop() {
            if !reachable.insert(object_id.clone()) {
                continue;
            }

            match self.parse_object(&object_id)? {
                ObjectBox::Commit(commit) => {
                    queue.push(commit.tree_oid().clone());
                    queue.extend(commit.parents().iter().cloned());
                }
                ObjectBox::Tree(tree) => {
                    queue.extend(tree.into_entries().map(|(_, entry)| entry.oid));
                }
                ObjectBox::Blob(_) => {}
            }
        }

        Ok(reachable)
    }

    /// Load the decompressed object content, header included
    pub fn load(&self, object_id: &ObjectId) -> anyhow::Result<Bytes> {
        let object_path = self.path.join(object_id.to_path());

        let compressed = match std::fs::read(&object_path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(GitError::NotFound(format!("object {object_id}")).into());
            }
            Err(e) => {
                return Err(e).context(format!(
                    "unable to read object file {}",
                    object_path.display()
                ));
            }
        };

        Self::decompress(Bytes::from(compressed))
            .with_context(|| format!("unable to decompress object {object_id}"))
    }

    fn write_if_absent(&self, object_id: &ObjectId, content: Bytes) -> anyhow::Result<()> {
        let object_path = self.path.join(object_id.to_path());
        if object_path.exists() {
            return Ok(());
        }

        let object_dir = object_path
            .parent()
            .context(format!("invalid object path {}", object_path.display()))?;
        std::fs::create_dir_all(object_dir).context(format!(
            "unable to create object directory {}",
            object_dir.display()
        ))?;

        // assemble in a temp file, then rename into place
        let temp_path = object_dir.join(format!("tmp-obj-{}", rand::random::<u32>()));
        let compressed = Self::compress(content)?;

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .context(format!(
                "unable to open object file {}",
                temp_path.display()
            ))?;
        file.write_all(&compressed).context(format!(
            "unable to write object file {}",
            temp_path.display()
        ))?;

        std::fs::rename(&temp_path, &object_path).context(format!(
            "unable to rename object file to {}",
            object_path.display()
        ))?;

        Ok(())
    }

    fn compress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder
            .write_all(&data)
            .context("unable to compress object content")?;

        encoder
            .finish()
            .map(Bytes::from)
            .context("unable to finish compressing object content")
    }

    fn decompress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut decoder = flate2::read::ZlibDecoder::new(&*data);
        let mut decompressed = Vec::new();
        decoder
            .read_to_end(&mut decompressed)
            .map_err(|e| GitError::Corrupt(format!("object zlib stream: {e}")))?;

        Ok(Bytes::from(decompressed))
    }
}
