//! Status report assembly
//!
//! Gathers the three inputs (working tree file set, index, HEAD tree),
//! classifies every path, and renders the report. With no HEAD commit the
//! HEAD tree is empty, so everything staged shows as added and everything
//! else as untracked.

use crate::areas::index::Index;
use crate::areas::repository::Repository;
use crate::artifacts::index::index_entry::EntryMetadata;
use crate::artifacts::status::file_change::{IndexChangeType, WorkspaceChangeType};
use crate::artifacts::status::inspector::Inspector;
use derive_new::new;
use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use std::path::PathBuf;

const LABEL_INDENT: &str = "        ";

/// Classified changes, sorted by path
#[derive(Debug, Default)]
pub struct StatusReport {
    pub branch: Option<String>,
    pub index_changes: BTreeMap<PathBuf, IndexChangeType>,
    pub workspace_changes: BTreeMap<PathBuf, WorkspaceChangeType>,
    pub untracked_files: BTreeSet<PathBuf>,
}

impl StatusReport {
    pub fn is_clean(&self) -> bool {
        self.index_changes.is_empty()
            && self.workspace_changes.is_empty()
            && self.untracked_files.is_empty()
    }

    pub fn render(&self, writer: &mut dyn Write) -> anyhow::Result<()> {
        if let Some(branch) = &self.branch {
            writeln!(writer, "On branch {branch}")?;
        }

        if !self.index_changes.is_empty() {
            writeln!(writer, "\nChanges to be committed:")?;
            for (path, change) in &self.index_changes {
                writeln!(writer, "{LABEL_INDENT}{}{}", change.label(), path.display())?;
            }
        }

        if !self.workspace_changes.is_empty() {
            writeln!(writer, "\nChanges not staged for commit:")?;
            for (path, change) in &self.workspace_changes {
                writeln!(writer, "{LABEL_INDENT}{}{}", change.label(), path.display())?;
            }
        }

        if !self.untracked_files.is_empty() {
            writeln!(writer, "\nUntracked files:")?;
            for path in &self.untracked_files {
                writeln!(writer, "{LABEL_INDENT}{}", path.display())?;
            }
        }

        if self.is_clean() {
            writeln!(writer, "nothing to commit, working tree clean")?;
        }

        Ok(())
    }
}

#[derive(new)]
pub struct Status<'r> {
    repository: &'r Repository,
}

impl Status<'_> {
    pub fn collect(&self, index: &Index) -> anyhow::Result<StatusReport> {
        let inspector = Inspector::new(self.repository);

        let mut file_stats = BTreeMap::<PathBuf, EntryMetadata>::new();
        for path in self.repository.workspace().list_files(None)? {
            let stat = self.repository.workspace().stat_file(&path)?;
            file_stats.insert(path, stat);
        }

        let head_tree = self.repository.load_head_tree()?;

        let mut report = StatusReport {
            branch: self.current_branch()?,
            ..Default::default()
        };

        for path in file_stats.keys() {
            if index.entry_by_path(path).is_none() {
                report.untracked_files.insert(path.clone());
            }
        }

        for entry in index.entries() {
            let workspace_change = inspector
                .check_index_against_workspace(entry, file_stats.get(&entry.name))?;
            if workspace_change != WorkspaceChangeType::None {
                report
                    .workspace_changes
                    .insert(entry.name.clone(), workspace_change);
            }

            let index_change = inspector
                .check_index_against_head_tree(Some(entry), head_tree.get(&entry.name));
            if index_change != IndexChangeType::None {
                report.index_changes.insert(entry.name.clone(), index_change);
            }
        }

        // paths in HEAD that the index no longer tracks are staged deletes
        for path in head_tree.keys() {
            if index.entry_by_path(path).is_none() {
                report
                    .index_changes
                    .insert(path.clone(), IndexChangeType::Deleted);
            }
        }

        Ok(report)
    }

    fn current_branch(&self) -> anyhow::Result<Option<String>> {
        let current_ref = self.repository.refs().current_ref(None)?;

        if current_ref.is_head() {
            return Ok(Some("HEAD (detached)".to_string()));
        }

        Ok(current_ref
            .as_ref_path()
            .strip_prefix("refs/heads/")
            .map(str::to_string))
    }
}
