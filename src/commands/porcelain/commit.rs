use crate::areas::repository::Repository;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::objects::commit::{Author, Commit};
use std::io::Write;

impl Repository {
    /// Commit the staged tree: build the tree from the index, wrap it in
    /// a commit whose parent is the current HEAD, and advance the branch
    /// HEAD points at.
    pub fn commit(&self, message: &str) -> anyhow::Result<()> {
        let entries: Vec<IndexEntry> = {
            let mut index = self.index();
            index.rehydrate()?;
            index.entries().cloned().collect()
        };

        if entries.is_empty() {
            writeln!(self.writer(), "nothing to commit (index is empty)")?;
            return Ok(());
        }

        let tree_oid = self.store_tree_from_entries(&entries)?;

        let parent = self.refs().read_head()?;
        let root_marker = match parent {
            Some(_) => "",
            None => "(root-commit) ",
        };

        let author = Author::load_from_env()?;
        let message = message.trim().to_string();

        let commit = Commit::new(
            parent.into_iter().collect(),
            tree_oid,
            author,
            message,
        );
        let commit_oid = self.database().store(commit.clone())?;
        self.refs().update_head(&commit_oid)?;

        let branch = self
            .refs()
            .current_branch()?
            .map(|branch| branch.to_string())
            .unwrap_or_else(|| "HEAD".to_string());

        writeln!(
            self.writer(),
            "[{branch} {root_marker}{}] {}",
            commit_oid.to_short_oid(),
            commit.short_message()
        )?;

        Ok(())
    }
}
