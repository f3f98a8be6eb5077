//! Per-entry change detection
//!
//! Comparison is by content hash, with a stat fast path: when size, mode,
//! and both timestamps are unchanged the file cannot differ, and only when
//! the stat is ambiguous does the content get hashed.

use crate::areas::repository::Repository;
use crate::artifacts::database::database_entry::DatabaseEntry;
use crate::artifacts::index::index_entry::{EntryMetadata, IndexEntry};
use crate::artifacts::objects::object::Object;
use crate::artifacts::status::file_change::{IndexChangeType, WorkspaceChangeType};
use derive_new::new;

#[derive(new)]
pub struct Inspector<'r> {
    repository: &'r Repository,
}

impl Inspector<'_> {
    fn is_content_changed(&self, entry: &IndexEntry) -> anyhow::Result<bool> {
        let blob = self.repository.workspace().parse_blob(&entry.name)?;

        Ok(blob.object_id()? != entry.oid)
    }

    /// Index vs. working tree: `stat` is `None` when the file is gone.
    pub fn check_index_against_workspace(
        &self,
        entry: &IndexEntry,
        stat: Option<&EntryMetadata>,
    ) -> anyhow::Result<WorkspaceChangeType> {
        match stat {
            None => Ok(WorkspaceChangeType::Deleted),
            Some(stat) if !entry.stat_match(stat) => Ok(WorkspaceChangeType::Modified),
            Some(stat) if entry.times_match(stat) => Ok(WorkspaceChangeType::None),
            Some(_) if self.is_content_changed(entry)? => Ok(WorkspaceChangeType::Modified),
            Some(_) => Ok(WorkspaceChangeType::None),
        }
    }

    /// Index vs. HEAD tree: `head_entry` is `None` for paths HEAD lacks.
    pub fn check_index_against_head_tree(
        &self,
        index_entry: Option<&IndexEntry>,
        head_entry: Option<&DatabaseEntry>,
    ) -> IndexChangeType {
        match (index_entry, head_entry) {
            (Some(index_entry), Some(head_entry))
                if head_entry.mode != index_entry.metadata.mode
                    || head_entry.oid != index_entry.oid =>
            {
                IndexChangeType::Modified
            }
            (Some(_), None) => IndexChangeType::Added,
            (None, Some(_)) => IndexChangeType::Deleted,
            _ => IndexChangeType::None,
        }
    }
}
