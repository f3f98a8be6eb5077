use crate::areas::repository::Repository;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::Tree;
use std::io::Write;

impl Repository {
    /// Build and store the tree described by the index, printing the root
    /// tree's id. Running it twice over the same index yields the same id.
    pub fn write_tree(&self) -> anyhow::Result<()> {
        let mut index = self.index();
        index.rehydrate()?;

        let entries: Vec<IndexEntry> = index.entries().cloned().collect();
        let root_oid = self.store_tree_from_entries(&entries)?;

        writeln!(self.writer(), "{root_oid}")?;

        Ok(())
    }

    /// Build and store a tree straight from the working directory,
    /// creating blobs as it goes; the index is not consulted or touched.
    pub fn write_working_tree(&self) -> anyhow::Result<()> {
        let mut entries = Vec::new();

        for path in self.workspace().list_files(None)? {
            let blob = self.workspace().parse_blob(&path)?;
            let blob_oid = self.database().store(blob)?;
            let stat = self.workspace().stat_file(&path)?;

            entries.push(IndexEntry::new(path, blob_oid, stat));
        }

        let root_oid = self.store_tree_from_entries(&entries)?;

        writeln!(self.writer(), "{root_oid}")?;

        Ok(())
    }

    /// Assemble the tree hierarchy and store every node, children first
    pub(crate) fn store_tree_from_entries(
        &self,
        entries: &[IndexEntry],
    ) -> anyhow::Result<ObjectId> {
        let tree = Tree::build(entries.iter())?;

        tree.traverse(&|subtree| self.database().store(subtree.clone()).map(|_| ()))?;

        tree.object_id()
    }
}
